//! # 参数解析工具
//!
//! 解析命令行与回放脚本中的数值输入：
//! - 波长：辐射源名称（cu-ka, mo-ka ...）或数值
//! - 晶格常数：`"4,0,5"`, `"(4 0 5)"`
//! - 位点列表：`"(-2,-3);(1,0)"`
//! - 角度范围：`"0-90"`
//!
//! ## 依赖关系
//! - 被 `cli/` 和 `commands/` 使用
//! - 使用 `regex` crate

use crate::error::{Result, XrayError};
use crate::models::{LatticeConstants, LatticeSite};

use regex::Regex;
use std::sync::OnceLock;

/// 预定义辐射源波长 (Å)
pub fn get_predefined_wavelength(name: &str) -> Option<f64> {
    match name.to_lowercase().as_str() {
        "cu-ka" | "cuka" => Some(1.5418),
        "cu-ka1" | "cuka1" => Some(1.5406),
        "cu-ka2" | "cuka2" => Some(1.5444),
        "cu-kb1" | "cukb1" => Some(1.3922),
        "mo-ka" | "moka" => Some(0.7107),
        "mo-ka1" | "moka1" => Some(0.7093),
        "co-ka" | "coka" => Some(1.7903),
        "fe-ka" | "feka" => Some(1.9373),
        "cr-ka" | "crka" => Some(2.2910),
        "ag-ka" | "agka" => Some(0.5609),
        _ => None,
    }
}

/// 解析波长输入（辐射源名称或数值）
pub fn parse_wavelength(input: &str) -> Result<f64> {
    let input = input.trim();
    if let Some(wl) = get_predefined_wavelength(input) {
        return Ok(wl);
    }
    let value: f64 = input.parse().map_err(|_| {
        XrayError::InvalidArgument(format!(
            "Invalid wavelength '{}'. Use a number (e.g., 1.5) or a name: cu-ka, mo-ka, co-ka, fe-ka, cr-ka, ag-ka",
            input
        ))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(XrayError::InvalidArgument(format!(
            "wavelength must be a non-negative finite number, got {}",
            input
        )));
    }
    Ok(value)
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("valid number regex")
    })
}

fn tuple_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\(?\s*([^()]*?)\s*\)?$").expect("valid tuple regex"))
}

/// 解析数值向量，分隔符可以是逗号、空格或分号，可带括号
pub fn parse_vector(input: &str, len: usize) -> Result<Vec<f64>> {
    let err = |reason: String| XrayError::InvalidVector {
        input: input.to_string(),
        reason,
    };

    let body = tuple_regex()
        .captures(input.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| err("unbalanced parentheses".to_string()))?;

    let leftover = number_regex().replace_all(body, "");
    if leftover.chars().any(|c| !(c.is_whitespace() || c == ',' || c == ';')) {
        return Err(err(format!("unexpected characters '{}'", leftover.trim())));
    }

    let values: Vec<f64> = number_regex()
        .find_iter(body)
        .map(|m| m.as_str().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| err(e.to_string()))?;

    if values.len() != len {
        return Err(err(format!(
            "expected {} components, found {}",
            len,
            values.len()
        )));
    }
    Ok(values)
}

/// 解析晶格常数 "x,y,z"
pub fn parse_constants(input: &str) -> Result<LatticeConstants> {
    let v = parse_vector(input, 3)?;
    Ok(LatticeConstants::new(v[0], v[1], v[2]))
}

/// 解析位点列表 "(x,y);(x,y)"，空字符串表示空列表
pub fn parse_sites(input: &str) -> Result<Vec<LatticeSite>> {
    input
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_vector(s, 2).map(|v| LatticeSite::new(v[0], v[1])))
        .collect()
}

/// 解析角度范围 "min-max"（度）
pub fn parse_range(range: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = range.split('-').collect();
    if parts.len() != 2 {
        return Err(XrayError::InvalidRange(range.to_string()));
    }

    let min: f64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| XrayError::InvalidRange(range.to_string()))?;
    let max: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| XrayError::InvalidRange(range.to_string()))?;

    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wavelength() {
        assert_eq!(parse_wavelength("cu-ka").unwrap(), 1.5418);
        assert_eq!(parse_wavelength("MoKa").unwrap(), 0.7107);
        assert_eq!(parse_wavelength(" 2.5 ").unwrap(), 2.5);
        assert_eq!(parse_wavelength("0").unwrap(), 0.0);
        assert!(parse_wavelength("-1").is_err());
        assert!(parse_wavelength("xx-ka").is_err());
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(
            parse_constants("4,0,5").unwrap(),
            LatticeConstants::new(4.0, 0.0, 5.0)
        );
        assert_eq!(
            parse_constants("(8 0 6.5)").unwrap(),
            LatticeConstants::new(8.0, 0.0, 6.5)
        );
        assert_eq!(
            parse_constants("1e1, -0.5, .25").unwrap(),
            LatticeConstants::new(10.0, -0.5, 0.25)
        );
        assert!(parse_constants("4,0").is_err());
        assert!(parse_constants("4,x,5").is_err());
    }

    #[test]
    fn test_parse_sites() {
        let sites = parse_sites("(-2,-3); (1, 0)").unwrap();
        assert_eq!(sites, vec![LatticeSite::new(-2.0, -3.0), LatticeSite::new(1.0, 0.0)]);
        assert!(parse_sites("").unwrap().is_empty());
        assert!(parse_sites("(1,2,3)").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("0-90").unwrap(), (0.0, 90.0));
        assert_eq!(parse_range("5.5 - 40").unwrap(), (5.5, 40.0));
        assert!(parse_range("90").is_err());
        assert!(parse_range("a-b").is_err());
    }
}
