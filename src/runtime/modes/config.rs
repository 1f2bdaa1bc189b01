//! Config mode: write a sample configuration file

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::errors::Result;

/// 默认输出路径
pub const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// 生成示例配置；文件已存在且未指定 `force` 时交互确认
///
/// 返回是否写入了文件。
pub fn generate_config(output_path: Option<String>, force: bool) -> Result<bool> {
    let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());

    if !force && Path::new(&path).exists() {
        print!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite? [y/N] ".yellow()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(false);
        }
    }

    StaticConfig::default().save_to_file(&path)?;
    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(true)
}
