//! # 回放脚本解析器
//!
//! 解析参数变更脚本，每行一条命令。
//!
//! ## 脚本格式
//! ```text
//! # 注释与空行被忽略，关键字不区分大小写
//! angle 30            # 入射角（度）
//! wavelength cu-ka    # 波长：辐射源名称或数值
//! lattice 4, 0, 5     # 晶格常数 x y z
//! begin               # 批处理开始，可嵌套
//!   angle 45
//!   wavelength 2
//! end                 # 批处理结束，派生量只重算一次
//! show                # 打印当前面板
//! reset               # 恢复初始参数
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/replay.rs` 使用
//! - 使用 `utils/parse.rs` 解析数值

use crate::error::{Result, XrayError};
use crate::models::LatticeConstants;
use crate::utils::parse;

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// 单条变更命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 入射角（度）
    Angle(f64),
    Wavelength(f64),
    Lattice(LatticeConstants),
    Show,
    Reset,
}

/// 脚本步骤
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Apply { line: usize, command: Command },
    Batch { line: usize, steps: Vec<Step> },
}

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z]+)\s*(.*?)\s*$").expect("valid line regex"))
}

/// 读取并解析脚本文件
pub fn parse_script_file(path: &Path) -> Result<Vec<Step>> {
    let content = fs::read_to_string(path).map_err(|e| XrayError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_script(&content)
}

/// 从字符串内容解析脚本
pub fn parse_script(content: &str) -> Result<Vec<Step>> {
    // 栈底是顶层步骤，每个 begin 压入一层
    let mut stack: Vec<(usize, Vec<Step>)> = vec![(0, Vec::new())];

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }

        let caps = line_regex()
            .captures(text)
            .ok_or_else(|| script_err(line, format!("cannot parse '{}'", text)))?;
        let keyword = caps[1].to_lowercase();
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        let command = match keyword.as_str() {
            "begin" => {
                expect_no_argument(line, &keyword, rest)?;
                stack.push((line, Vec::new()));
                continue;
            }
            "end" => {
                expect_no_argument(line, &keyword, rest)?;
                if stack.len() < 2 {
                    return Err(script_err(line, "'end' without matching 'begin'".to_string()));
                }
                let (begin_line, steps) = stack.pop().unwrap_or_default();
                push_step(&mut stack, Step::Batch { line: begin_line, steps });
                continue;
            }
            "angle" => Command::Angle(parse_number(line, rest)?),
            "wavelength" => Command::Wavelength(
                parse::parse_wavelength(rest).map_err(|e| script_err(line, e.to_string()))?,
            ),
            "lattice" => Command::Lattice(
                parse::parse_constants(rest).map_err(|e| script_err(line, e.to_string()))?,
            ),
            "show" => {
                expect_no_argument(line, &keyword, rest)?;
                Command::Show
            }
            "reset" => {
                expect_no_argument(line, &keyword, rest)?;
                Command::Reset
            }
            other => return Err(script_err(line, format!("unknown command '{}'", other))),
        };

        push_step(&mut stack, Step::Apply { line, command });
    }

    if stack.len() > 1 {
        let (begin_line, _) = stack[stack.len() - 1];
        return Err(script_err(begin_line, "'begin' is never closed".to_string()));
    }

    Ok(stack.pop().map(|(_, steps)| steps).unwrap_or_default())
}

fn push_step(stack: &mut [(usize, Vec<Step>)], step: Step) {
    if let Some((_, steps)) = stack.last_mut() {
        steps.push(step);
    }
}

fn parse_number(line: usize, text: &str) -> Result<f64> {
    let value: f64 = text
        .parse()
        .map_err(|_| script_err(line, format!("expected a number, got '{}'", text)))?;
    if !value.is_finite() {
        return Err(script_err(line, format!("value must be finite, got '{}'", text)));
    }
    Ok(value)
}

fn expect_no_argument(line: usize, keyword: &str, rest: &str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(script_err(
            line,
            format!("'{}' takes no argument, got '{}'", keyword, rest),
        ))
    }
}

fn script_err(line: usize, reason: String) -> XrayError {
    XrayError::ScriptError { line, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_script() {
        let steps = parse_script(
            "# demo\nangle 30\n\nWavelength cu-ka\nlattice 4, 0, 5  # comment\nshow\n",
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Apply { line: 2, command: Command::Angle(30.0) },
                Step::Apply { line: 4, command: Command::Wavelength(1.5418) },
                Step::Apply {
                    line: 5,
                    command: Command::Lattice(LatticeConstants::new(4.0, 0.0, 5.0)),
                },
                Step::Apply { line: 6, command: Command::Show },
            ]
        );
    }

    #[test]
    fn test_parse_nested_batch() {
        let steps = parse_script("begin\n angle 10\n begin\n  wavelength 2\n end\nend\nreset").unwrap();

        assert_eq!(steps.len(), 2);
        match &steps[0] {
            Step::Batch { line, steps } => {
                assert_eq!(*line, 1);
                assert_eq!(steps.len(), 2);
                assert!(matches!(steps[1], Step::Batch { line: 3, .. }));
            }
            other => panic!("expected batch, got {:?}", other),
        }
        assert_eq!(steps[1], Step::Apply { line: 7, command: Command::Reset });
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let cases = [
            ("angle 30\nangle abc", 2),
            ("end", 1),
            ("angle 1\nbegin\nangle 2", 2),
            ("jump 3", 1),
            ("lattice 1 2", 1),
            ("show now", 1),
        ];

        for (script, expected) in cases {
            match parse_script(script) {
                Err(XrayError::ScriptError { line, .. }) => assert_eq!(line, expected, "{}", script),
                other => panic!("expected script error for {:?}, got {:?}", script, other),
            }
        }
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script("# only comments\n\n").unwrap().is_empty());
    }
}
