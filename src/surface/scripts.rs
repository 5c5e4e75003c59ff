//! 注入页面执行的 JS 片段

/// 把 `document.body` 序列化为 `ContentNode` 结构
pub const SNAPSHOT_SCRIPT: &str = r#"
(() => {
    const SKIP = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
    const walk = (node) => {
        if (node.nodeType === Node.TEXT_NODE) {
            const text = node.textContent;
            return text && text.trim() ? { tag: '#text', text } : null;
        }
        if (node.nodeType !== Node.ELEMENT_NODE || SKIP.has(node.tagName)) {
            return null;
        }
        const attrs = {};
        for (const attr of node.attributes) {
            attrs[attr.name] = attr.value;
        }
        const children = [];
        for (const child of node.childNodes) {
            const value = walk(child);
            if (value) children.push(value);
        }
        return { tag: node.tagName.toLowerCase(), attrs, children };
    };
    return document.body ? walk(document.body) : { tag: 'body' };
})()
"#;

/// 点击题号按钮，参数 `{ id }`
///
/// 依次尝试：title 属性 → 题号容器内的按钮 → 任意按钮 → role=button。
/// 找到后先把横向滚动容器滚到按钮附近再点击。
pub const SELECT_TARGET_FN: &str = r#"
({ id }) => {
    const label = String(id);
    const titles = [`Savol ${label}`, `Вопрос ${label}`, `Савол ${label}`];
    const container = document.querySelector('.flex.min-w-max');
    const candidates = Array.from(document.querySelectorAll('button, [role="button"]'));
    const textOf = (el) => (el.textContent || '').trim();
    const strategies = [
        ['title', (el) => titles.includes(el.getAttribute('title'))],
        ['container-text', (el) => !!container && container.contains(el) && textOf(el) === label],
        ['button-text', (el) => el.tagName === 'BUTTON' && textOf(el) === label],
        ['role-text', (el) => textOf(el) === label],
    ];
    for (const [name, test] of strategies) {
        const target = candidates.find(test);
        if (!target) continue;
        if (container && container.contains(target)) {
            const offset = target.getBoundingClientRect().left
                - container.getBoundingClientRect().left
                + container.scrollLeft;
            container.scrollLeft = Math.max(0, offset - 200);
        }
        target.scrollIntoView({ block: 'center', inline: 'nearest' });
        target.click();
        return { clicked: true, strategy: name };
    }
    return { clicked: false, strategy: null };
}
"#;

/// 点击第一个选项以显示正确答案，参数 `{ id }`
pub const REVEAL_ANSWER_FN: &str = r#"
({ id }) => {
    const option = document.querySelector(`label[for^="${id}-opt-"]`);
    if (!option) return false;
    option.click();
    return true;
}
"#;

/// 展开解析面板；面板已展开（按钮显示"隐藏"）时不再点击
pub const EXPAND_EXPLANATION_SCRIPT: &str = r#"
(() => {
    const SHOW = ['Показать объяснение', 'Izohni ko', 'Изоҳни кўриш'];
    const HIDE = ['Скрыть объяснение', 'Izohni yashirish', 'Изоҳни яшириш'];
    const buttons = Array.from(document.querySelectorAll('button'))
        .filter((el) => el.offsetParent !== null);
    const has = (el, texts) => texts.some((t) => (el.textContent || '').includes(t));
    if (buttons.some((el) => has(el, HIDE))) return true;
    const target = buttons.find((el) => has(el, SHOW))
        || buttons.find((el) => el.querySelector('svg[class*="lucide-info"]'));
    if (!target) return false;
    target.click();
    return true;
})()
"#;
