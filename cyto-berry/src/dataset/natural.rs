//! 文件名的自然排序: 连续数字按数值比较, 因此 `img2` 排在 `img10` 之前.

use std::cmp::Ordering;

/// 文件名的一个片段.
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    /// 连续数字, 已去掉前导零.
    Digits(&'a str),
    /// 其他字符.
    Text(&'a str),
}

/// 把 `s` 拆分为交替的数字/非数字片段.
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut ans = Vec::new();
    let mut rest = s;
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        ans.push(if is_digit {
            let trimmed = head.trim_start_matches('0');
            Chunk::Digits(if trimmed.is_empty() { "0" } else { trimmed })
        } else {
            Chunk::Text(head)
        });
        rest = tail;
    }
    ans
}

fn cmp_chunk(a: &Chunk, b: &Chunk) -> Ordering {
    match (a, b) {
        // 没有前导零时, 位数多的数更大; 位数相同时按字典序.
        (Chunk::Digits(x), Chunk::Digits(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
    }
}

/// 自然序比较. 片段完全相同 (如 `a01` 与 `a1`) 时退回到普通字典序, 保证全序.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    ca.iter()
        .zip(cb.iter())
        .map(|(x, y)| cmp_chunk(x, y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| ca.len().cmp(&cb.len()))
        .then_with(|| a.cmp(b))
}
