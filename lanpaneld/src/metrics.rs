use sysinfo::System;
use shared::types::SystemMetrics;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Take a fresh metrics snapshot. CPU usage needs two samples with a short
/// gap between them to produce a meaningful delta.
pub async fn collect() -> SystemMetrics {
    let mut system = System::new();

    system.refresh_cpu_usage();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    system.refresh_cpu_usage();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage().round() as u64;
    let total = system.total_memory();
    let used = system.used_memory();

    SystemMetrics {
        cpu_usage,
        ram_usage: percent(used, total),
        ram_total: format_gb(total, 0),
        ram_used: format_gb(used, 1),
    }
}

fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u64
}

fn format_gb(bytes: u64, precision: usize) -> String {
    format!("{:.*}GB", precision, bytes as f64 / GIB)
}
