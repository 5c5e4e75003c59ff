/// 单次抽取的临时结果，合并进记录后即丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    /// 题干（未找到时为空）
    pub text: String,
    /// 原始选项文本（无前缀）
    pub options: Vec<String>,
    /// 正确答案序号（从 1 开始，无法判断时为 1）
    pub correct_index: usize,
    /// 解析（未找到时为空）
    pub explanation: String,
    /// 题目图片的绝对地址
    pub image_url: Option<String>,
}
