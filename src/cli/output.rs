//! Console formatting helpers for the CLI

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Per-player values as `p0=0.250 p1=-0.250`.
pub fn format_per_player(values: &[f64]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(player, value)| format!("p{player}={value:.3}"))
        .collect::<Vec<_>>()
        .join(" ")
}
