use crate::error::{LabelError, Result};

/// 解析EDF时间字符串为100纳秒单位
pub fn parse_edf_time(s: &str) -> Result<i64> {
    let s = s.trim();

    if s.is_empty() {
        return Err(LabelError::InvalidFormat("Empty time string".to_string()));
    }

    // 处理符号
    let (negative, s) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let mut value = 0i64;

    if let Some(dot_pos) = s.find('.') {
        // 有小数部分
        let integer_part = &s[..dot_pos];
        let decimal_part = &s[dot_pos + 1..];

        if !integer_part.is_empty() {
            value += integer_part
                .parse::<i64>()
                .map_err(|_| LabelError::InvalidFormat("Invalid integer part".to_string()))?
                * crate::EDF_TIME_DIMENSION;
        }

        // 解析小数部分（最多7位精度）
        if !decimal_part.is_empty() {
            let decimal_str = if decimal_part.len() > 7 {
                &decimal_part[..7]
            } else {
                decimal_part
            };

            let decimal_value = decimal_str
                .parse::<i64>()
                .map_err(|_| LabelError::InvalidFormat("Invalid decimal part".to_string()))?;

            let scale = 10i64.pow(7 - decimal_str.len() as u32);
            value += decimal_value * scale;
        }
    } else {
        // 只有整数部分
        value = s
            .parse::<i64>()
            .map_err(|_| LabelError::InvalidFormat("Invalid integer".to_string()))?
            * crate::EDF_TIME_DIMENSION;
    }

    if negative {
        value = -value;
    }

    Ok(value)
}

/// 非本地化的整数解析（避免受系统locale影响）
pub fn atoi_nonlocalized(s: &str) -> i32 {
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }

    s.parse().unwrap_or(0)
}

/// 非本地化的浮点数解析
pub fn atof_nonlocalized(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    s.parse().unwrap_or(0.0)
}
