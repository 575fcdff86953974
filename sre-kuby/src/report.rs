use std::io::{self, Write};

use console::style;
use kubeconf::KubeConfig;
use similar::TextDiff;
use tabular::{row, Table};

/// Lists the contexts this run added, marking the current one.
pub fn print_summary(out: &mut impl Write, kc: &KubeConfig, added: &[String]) -> io::Result<()> {
    if added.is_empty() {
        return writeln!(
            out,
            "{}",
            style("None of the servers were reachable, no contexts were added.").yellow()
        );
    }

    writeln!(out, "\nContexts:")?;
    let mut table = Table::new("{:<} {:<} {:<} {:<}");
    for name in added {
        let Some(ctx) = kc.contexts.get(name) else {
            continue;
        };
        let server = kc
            .clusters
            .get(&ctx.cluster)
            .map(|cluster| cluster.server.as_str())
            .unwrap_or("?");
        let marker = if *name == kc.current_context { '*' } else { ' ' };
        let user = &ctx.user;
        table.add_row(row!(
            marker,
            name,
            format!("🖥  {server}"),
            format!("🧑 {user}")
        ));
    }
    writeln!(out, "{table}")
}

/// Unified diff of the active config against the generated one.
pub fn print_diff(out: &mut impl Write, current: &str, generated: &str) -> io::Result<()> {
    if current == generated {
        return writeln!(out, "The generated config is identical to the current one.");
    }

    let diff = TextDiff::from_lines(current, generated);
    let rendered = diff
        .unified_diff()
        .context_radius(3)
        .header("config", "config_new")
        .to_string();

    for line in rendered.lines() {
        let line = match line.chars().next() {
            Some('+') => style(line).green(),
            Some('-') => style(line).red(),
            Some('@') => style(line).cyan(),
            _ => style(line),
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}
