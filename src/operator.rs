//! 操作员交互
//!
//! 语言和题目范围可以来自配置；没有配置时在终端询问。
//! 开始抽取前需要操作员在页面上切换好语言并按回车确认。

use std::io::Write;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use crate::models::{parse_id_range, Language};

/// 终端交互
pub struct Operator<R> {
    lines: Lines<R>,
}

impl Operator<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Operator<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines() }
    }

    /// 确定本轮语言：配置优先，否则反复询问直到输入合法
    pub async fn choose_language(&mut self, preset: Option<&str>) -> Result<Language> {
        if let Some(code) = preset {
            let language = code.parse::<Language>()?;
            info!("🌍 使用配置的语言: {}", language);
            return Ok(language);
        }

        println!("\n{}", "=".repeat(60));
        println!("🌍 选择语言");
        println!("{}", "=".repeat(60));
        for language in Language::ALL {
            println!("  {:<4}- {}", language.code(), language.display_name());
        }

        loop {
            let input = self.prompt("\n📝 输入语言代码 (uz/ru/uzk): ").await?;
            match input.parse::<Language>() {
                Ok(language) => return Ok(language),
                Err(_) => println!("❌ 无效的语言代码，请输入 uz、ru 或 uzk"),
            }
        }
    }

    /// 确定题目范围：配置优先，否则反复询问直到输入合法
    pub async fn choose_ids(&mut self, language: Language, preset: Option<&str>) -> Result<Vec<u32>> {
        if let Some(range) = preset {
            let ids = parse_id_range(range)?;
            info!("📋 使用配置的题目范围: {} (共 {} 个)", range, ids.len());
            return Ok(ids);
        }

        println!("\n📋 {} 的题目范围", language.code().to_uppercase());
        println!("{}", "=".repeat(60));
        println!("示例:");
        println!("  7     - 只处理第 7 题");
        println!("  1-100 - 第 1 到 100 题");
        println!("  17-75 - 第 17 到 75 题");

        loop {
            let input = self.prompt("\n📝 输入题号或范围: ").await?;
            match parse_id_range(&input) {
                Ok(ids) => {
                    let preview: Vec<u32> = ids.iter().take(5).copied().collect();
                    println!(
                        "✅ 已选择 {} 个题目: {:?}{}",
                        ids.len(),
                        preview,
                        if ids.len() > 5 { "..." } else { "" }
                    );
                    return Ok(ids);
                }
                Err(_) => println!("❌ 格式错误，请输入 7 或 7-10"),
            }
        }
    }

    /// 等待操作员在页面上切换语言后按回车
    pub async fn wait_ready(&mut self, language: Language) -> Result<()> {
        println!("❗ 请在网站上切换到 {} ({})", language.code().to_uppercase(), language.display_name());
        self.prompt("\n⌨️  切换完成后按回车开始抽取...").await?;
        Ok(())
    }

    async fn prompt(&mut self, message: &str) -> Result<String> {
        print!("{}", message);
        std::io::stdout().flush().context("无法写入终端")?;

        match self.lines.next_line().await.context("读取输入失败")? {
            Some(line) => Ok(line.trim().to_string()),
            None => bail!("输入已结束"),
        }
    }
}
