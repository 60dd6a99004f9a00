use colored::Colorize;
use gceprice_core::*;

// ── formatting helpers ────────────────────────────────────────────────────────

pub fn fmt_cost(cost: Option<f64>) -> String {
    match cost {
        Some(c) => format!("${:.2}", c),
        None => "-".to_string(),
    }
}

pub fn fmt_pct(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.0}%", r),
        None => "-".to_string(),
    }
}

pub fn fmt_memory(memory_mb: Option<u64>) -> String {
    match memory_mb {
        Some(mb) => format!("{:.1}", mb as f64 / 1024.0),
        None => "-".to_string(),
    }
}

pub fn fmt_ts(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

// ── pricing table ─────────────────────────────────────────────────────────────

pub fn print_rows(rows: &[&PricingRow], generated_at: Option<chrono::DateTime<chrono::Utc>>) {
    if rows.is_empty() {
        println!("{}", "No prices found.".yellow());
        return;
    }

    let (w_region, w_name, w_family, w_cpu, w_mem, w_cost, w_pct) = (24, 26, 16, 4, 7, 10, 5);

    println!(
        "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}  {:>w4$}  {:>w5$}  {:>w5$}  {:>w5$}  {:>w5$}  {:>w6$}",
        "REGION".bold(),
        "NAME".bold(),
        "FAMILY".bold(),
        "CPUS".bold(),
        "MEM GB".bold(),
        "ON-DEMAND".bold(),
        "SPOT".bold(),
        "1YR".bold(),
        "3YR".bold(),
        "SPOT%".bold(),
        w0 = w_region,
        w1 = w_name,
        w2 = w_family,
        w3 = w_cpu,
        w4 = w_mem,
        w5 = w_cost,
        w6 = w_pct,
    );
    println!(
        "{}",
        "─".repeat(w_region + w_name + w_family + w_cpu + w_mem + w_cost * 4 + w_pct + 18)
    );

    for r in rows {
        let name = match r.kind {
            ShapeKind::Machine => r.name.cyan().to_string(),
            ShapeKind::Accelerator => r.name.magenta().to_string(),
        };
        let on_demand = match r.price.total_on_demand {
            Some(_) => fmt_cost(r.price.total_on_demand).green().to_string(),
            None => "-".dimmed().to_string(),
        };

        println!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}  {:>w4$}  {:>w5$}  {:>w5$}  {:>w5$}  {:>w5$}  {:>w6$}",
            truncate(&r.region, w_region),
            name,
            truncate(&r.family, w_family),
            r.guest_cpus.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            fmt_memory(r.memory_mb),
            on_demand,
            fmt_cost(r.price.total_spot),
            fmt_cost(r.price.total_commit_1yr),
            fmt_cost(r.price.total_commit_3yr),
            fmt_pct(r.price.discount_rate_spot).yellow(),
            w0 = w_region,
            w1 = w_name,
            w2 = w_family,
            w3 = w_cpu,
            w4 = w_mem,
            w5 = w_cost,
            w6 = w_pct,
        );
    }

    let unpriced = rows.iter().filter(|r| r.price.total_on_demand.is_none()).count();
    print!("\n{} rows", rows.len());
    if unpriced > 0 {
        print!(" ({} without on-demand price)", unpriced.to_string().yellow());
    }
    println!("  ·  generated {}", fmt_ts(generated_at));
}

// ── index build ───────────────────────────────────────────────────────────────

pub fn print_build_stats(stats: &BuildStats, index: &PriceIndex) {
    println!("\n{}", "── Price Index ─────────────────────────────────────────────────".bold());
    println!("  SKUs read      : {}", stats.skus_seen);
    println!("  Filtered       : {}", stats.filtered);
    println!("  Unclassified   : {}", stats.unclassified.to_string().yellow());
    println!("  Collisions     : {} ({} replaced)", stats.collisions, stats.replaced);
    println!("  Regions        : {}", index.regions().len());
    println!("  Price slots    : {}", index.len().to_string().green().bold());
    println!();
}
