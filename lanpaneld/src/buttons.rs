use shared::types::{Button, ButtonToggle, SystemMetrics};
use crate::net::probe::Probe;
use crate::state_manager::RuntimeState;

/// Fill in live values and toggle states for the configured button list.
/// Online toggles cost one probe each, so panels should keep them few.
pub async fn render(
    buttons: Vec<Button>,
    metrics: &SystemMetrics,
    runtime: &RuntimeState,
    prober: &dyn Probe,
) -> Vec<Button> {
    let mut rendered = Vec::with_capacity(buttons.len());

    for mut button in buttons {
        if let Some(template) = button.value.take() {
            button.value = Some(render_value(&template, metrics, runtime));
        }

        button.toggle_state = match &button.toggle {
            Some(ButtonToggle::Maintenance) => Some(runtime.maintenance),
            Some(ButtonToggle::Online { target }) => Some(prober.is_online(target).await),
            None => button.toggle_state,
        };

        rendered.push(button);
    }

    rendered
}

/// Substitute the fixed placeholder set. Unknown placeholders are left
/// untouched rather than failing the whole render.
pub fn render_value(template: &str, metrics: &SystemMetrics, runtime: &RuntimeState) -> String {
    let cache_cleared = runtime
        .cache_cleared
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    template
        .replace("{cpu}", &metrics.cpu_usage.to_string())
        .replace("{ramUsage}", &metrics.ram_usage.to_string())
        .replace("{ramTotal}", &metrics.ram_total)
        .replace("{ramUsed}", &metrics.ram_used)
        .replace("{maintenance}", if runtime.maintenance { "true" } else { "false" })
        .replace("{cache_cleared}", &cache_cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedProbe(bool);

    #[async_trait]
    impl Probe for FixedProbe {
        async fn is_online(&self, _target: &str) -> bool {
            self.0
        }
    }

    fn test_metrics() -> SystemMetrics {
        SystemMetrics {
            cpu_usage: 42,
            ram_usage: 65,
            ram_total: "16GB".to_string(),
            ram_used: "10.4GB".to_string(),
        }
    }

    fn test_runtime(maintenance: bool) -> RuntimeState {
        RuntimeState {
            maintenance,
            cache_cleared: None,
        }
    }

    #[test]
    fn test_render_value_substitutes_metrics() {
        let rendered = render_value(
            "{cpu}% CPU, {ramUsed} of {ramTotal}",
            &test_metrics(),
            &test_runtime(false),
        );
        assert_eq!(rendered, "42% CPU, 10.4GB of 16GB");
    }

    #[test]
    fn test_render_value_leaves_unknown_placeholders() {
        let rendered = render_value("{bogus} {cpu}", &test_metrics(), &test_runtime(false));
        assert_eq!(rendered, "{bogus} 42");
    }

    #[test]
    fn test_render_value_cache_cleared_fallback() {
        let rendered = render_value("cleared: {cache_cleared}", &test_metrics(), &test_runtime(false));
        assert_eq!(rendered, "cleared: never");

        let runtime = RuntimeState {
            maintenance: false,
            cache_cleared: Some(Utc::now()),
        };
        let rendered = render_value("cleared: {cache_cleared}", &test_metrics(), &runtime);
        assert_ne!(rendered, "cleared: never");
    }

    #[tokio::test]
    async fn test_render_resolves_toggles() {
        let buttons = vec![
            Button {
                label: "Maintenance".to_string(),
                endpoint: Some("/v1/maintenance".to_string()),
                value: None,
                toggle: Some(ButtonToggle::Maintenance),
                toggle_state: None,
            },
            Button {
                label: "Router UI".to_string(),
                endpoint: None,
                value: None,
                toggle: Some(ButtonToggle::Online {
                    target: "192.168.1.1".to_string(),
                }),
                toggle_state: None,
            },
            Button {
                label: "CPU".to_string(),
                endpoint: None,
                value: Some("{cpu}%".to_string()),
                toggle: None,
                toggle_state: None,
            },
        ];

        let rendered = render(
            buttons,
            &test_metrics(),
            &test_runtime(true),
            &FixedProbe(true),
        )
        .await;

        assert_eq!(rendered[0].toggle_state, Some(true));
        assert_eq!(rendered[1].toggle_state, Some(true));
        assert_eq!(rendered[2].toggle_state, None);
        assert_eq!(rendered[2].value.as_deref(), Some("42%"));
    }
}
