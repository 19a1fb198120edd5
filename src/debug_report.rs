use jsonrouter::DispatchRun;
use std::path::Path;

/// ANSI styling keyed by what is being printed rather than by color.
struct Style {
    enabled: bool,
}

impl Style {
    const RESET: &'static str = "\x1b[0m";
    const TITLE: &'static str = "\x1b[1;36m";
    const SECTION: &'static str = "\x1b[90m";
    const RULE: &'static str = "\x1b[1;32m";
    const ROUTER: &'static str = "\x1b[34m";
    const VAR: &'static str = "\x1b[36m";
    const OK: &'static str = "\x1b[32m";
    const WARN: &'static str = "\x1b[33m";
    const MUTED: &'static str = "\x1b[2m";

    fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn apply(&self, code: &str, s: impl AsRef<str>) -> String {
        if self.enabled { format!("{code}{}{}", s.as_ref(), Self::RESET) } else { s.as_ref().to_string() }
    }

    fn section(&self, title: &str) -> String {
        format!("\n{}", self.apply(Self::SECTION, format!("━━━ {title} ━━━")))
    }

    fn muted(&self, s: impl AsRef<str>) -> String {
        self.apply(Self::MUTED, s)
    }

    /// Green when anything was delivered, muted otherwise.
    fn count(&self, count: usize, noun: &str) -> String {
        if count > 0 {
            self.apply(Self::OK, format!("✓ {count} {noun}"))
        } else {
            self.muted(format!("✗ {count} {noun}"))
        }
    }
}

pub fn print_run(rules: &Path, run: &DispatchRun, deliveries: &[(String, usize)], color: bool) {
    let style = Style::new(color);
    let metrics = &run.metrics;
    println!(
        "\n{}",
        style.apply(
            Style::TITLE,
            format!("⚙  Routing {} records through {} rules ({})", metrics.records, metrics.rules, rules.display())
        )
    );

    println!("{}", style.section("Matches"));
    if run.matches.is_empty() {
        println!("{}", style.muted("  No rule matched"));
        println!("\n{}", style.apply(Style::WARN, "Possible reasons:"));
        println!("  • A path query found nothing (check field names and nesting)");
        println!("  • An exclude pattern matched, or no include matched the whole value");
        println!("  • SNS messages are still JSON strings (try --sns)");
        println!("\n{}", style.muted("  Tip: Set RUST_LOG=jsonrouter=trace to see every rule/record outcome"));
    } else {
        print_matches(run, &style);
    }

    println!("{}", style.section("Deliveries"));
    print_deliveries(deliveries, &metrics.skipped, &style);

    println!("{}", style.section("Timing"));
    println!(
        "  Total: {}  │  Matching: {}  │  Dispatch: {}",
        style.apply(Style::OK, format!("{:?}", metrics.total)),
        style.apply(Style::VAR, format!("{:?}", metrics.matching)),
        style.muted(format!("{:?}", metrics.dispatch)),
    );
    println!();
}

fn print_matches(run: &DispatchRun, style: &Style) {
    for (idx, matched) in run.matches.iter().enumerate() {
        let routers: Vec<&str> = matched.routers.iter().map(|target| target.name().unwrap_or("?")).collect();
        println!(
            "  {} {} {} {}",
            style.apply(Style::SECTION, format!("[{idx}]")),
            style.apply(Style::RULE, &matched.name),
            style.muted("│ routers:"),
            style.apply(Style::ROUTER, routers.join(", ")),
        );
        for (key, value) in &matched.vars {
            println!("      {} {}", style.apply(Style::VAR, format!("{key}:")), value);
        }
        for line in matched.render().lines() {
            println!("      {} {}", style.muted("│"), line);
        }
    }
}

fn print_deliveries(deliveries: &[(String, usize)], skipped: &[String], style: &Style) {
    if deliveries.is_empty() {
        println!("  {}", style.muted("No routers declared"));
    }
    for (name, count) in deliveries {
        println!("  {} {}", style.apply(Style::ROUTER, format!("{name}:")), style.count(*count, "deliveries"));
    }
    if !skipped.is_empty() {
        println!("  {} {}", style.apply(Style::WARN, "skipped:"), style.muted(skipped.join(", ")));
    }
}
