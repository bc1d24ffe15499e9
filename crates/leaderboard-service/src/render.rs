//! 排行榜页面渲染
//!
//! 模板直接写在代码里，所有用户数据在插入前转义。

use std::fmt::Write as _;

use crate::models::Ranking;

/// 转义 HTML 特殊字符
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 渲染排名页面
///
/// `rankings` 必须已按排名顺序排好；名次从 1 开始，同分不并列
pub fn render_rankings_page(title: &str, rankings: &[Ranking]) -> String {
    let mut rows = String::new();
    for (index, ranking) in rankings.iter().enumerate() {
        // 写入 String 不会失败
        let _ = write!(
            rows,
            "\n            <tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            index + 1,
            escape_html(&ranking.username),
            ranking.points
        );
    }

    if rankings.is_empty() {
        rows.push_str("\n            <tr><td colspan=\"3\">No points awarded yet</td></tr>");
    }

    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; max-width: 640px; margin: 0 auto; padding: 2em; }}
        h1 {{ color: #333; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ text-align: left; padding: 0.5em; border-bottom: 1px solid #ddd; }}
        td:last-child, th:last-child {{ text-align: right; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <table>
        <thead>
            <tr><th>#</th><th>Contributor</th><th>Points</th></tr>
        </thead>
        <tbody>{rows}
        </tbody>
    </table>
</body>
</html>"#
    )
}
