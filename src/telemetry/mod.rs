//! Telemetry for NutriCare sessions
//!
//! Collects wizard events in-process and keeps running counters for the
//! REPL status view. Every recorded event is also emitted as a `tracing`
//! debug event.

use std::time::{Duration, Instant};

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    StepTransition {
        from: String,
        to: String,
        timestamp: Instant,
    },
    FieldEdited {
        field: String,
        timestamp: Instant,
    },
    AttachmentAdded {
        file_name: String,
        timestamp: Instant,
    },
    AttachmentRemoved {
        file_name: String,
        timestamp: Instant,
    },
    ItemAdded {
        name: String,
        calories: u32,
        timestamp: Instant,
    },
    ItemRemoved {
        name: String,
        timestamp: Instant,
    },
    MealCommitted {
        items: usize,
        calories: u32,
        timestamp: Instant,
    },
    /// An action refused because its precondition was not met
    ActionWithheld {
        action: String,
        reason: String,
        timestamp: Instant,
    },
}

impl TelemetryEvent {
    pub fn timestamp(&self) -> Instant {
        match self {
            TelemetryEvent::StepTransition { timestamp, .. }
            | TelemetryEvent::FieldEdited { timestamp, .. }
            | TelemetryEvent::AttachmentAdded { timestamp, .. }
            | TelemetryEvent::AttachmentRemoved { timestamp, .. }
            | TelemetryEvent::ItemAdded { timestamp, .. }
            | TelemetryEvent::ItemRemoved { timestamp, .. }
            | TelemetryEvent::MealCommitted { timestamp, .. }
            | TelemetryEvent::ActionWithheld { timestamp, .. } => *timestamp,
        }
    }

    /// One-line description for the status view
    pub fn describe(&self) -> String {
        match self {
            TelemetryEvent::StepTransition { from, to, .. } => format!("step {} -> {}", from, to),
            TelemetryEvent::FieldEdited { field, .. } => format!("edited {}", field),
            TelemetryEvent::AttachmentAdded { file_name, .. } => format!("attached {}", file_name),
            TelemetryEvent::AttachmentRemoved { file_name, .. } => format!("detached {}", file_name),
            TelemetryEvent::ItemAdded { name, calories, .. } => {
                format!("added {} ({} kcal)", name, calories)
            }
            TelemetryEvent::ItemRemoved { name, .. } => format!("removed {}", name),
            TelemetryEvent::MealCommitted { items, calories, .. } => {
                format!("committed meal, {} items, {} kcal", items, calories)
            }
            TelemetryEvent::ActionWithheld { action, reason, .. } => {
                format!("{} withheld: {}", action, reason)
            }
        }
    }
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryStats {
    pub step_transitions: usize,
    pub fields_edited: usize,
    pub attachments_added: usize,
    pub attachments_removed: usize,
    pub items_added: usize,
    pub items_removed: usize,
    pub meals_committed: usize,
    pub calories_committed: u64,
    pub actions_withheld: usize,
}

/// Telemetry collector
#[derive(Debug, Clone)]
pub struct TelemetryCollector {
    events: Vec<TelemetryEvent>,
    stats: TelemetryStats,
    start_time: Instant,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            stats: TelemetryStats::default(),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&mut self, event: TelemetryEvent) {
        match &event {
            TelemetryEvent::StepTransition { from, to, .. } => {
                self.stats.step_transitions += 1;
                tracing::debug!(%from, %to, "step transition");
            }
            TelemetryEvent::FieldEdited { field, .. } => {
                self.stats.fields_edited += 1;
                tracing::debug!(%field, "field edited");
            }
            TelemetryEvent::AttachmentAdded { file_name, .. } => {
                self.stats.attachments_added += 1;
                tracing::debug!(%file_name, "attachment added");
            }
            TelemetryEvent::AttachmentRemoved { file_name, .. } => {
                self.stats.attachments_removed += 1;
                tracing::debug!(%file_name, "attachment removed");
            }
            TelemetryEvent::ItemAdded { name, calories, .. } => {
                self.stats.items_added += 1;
                tracing::debug!(%name, calories, "item added");
            }
            TelemetryEvent::ItemRemoved { name, .. } => {
                self.stats.items_removed += 1;
                tracing::debug!(%name, "item removed");
            }
            TelemetryEvent::MealCommitted { items, calories, .. } => {
                self.stats.meals_committed += 1;
                self.stats.calories_committed += u64::from(*calories);
                tracing::debug!(items, calories, "meal committed");
            }
            TelemetryEvent::ActionWithheld { action, reason, .. } => {
                self.stats.actions_withheld += 1;
                tracing::debug!(%action, %reason, "action withheld");
            }
        }

        self.events.push(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        self.stats.clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let start = self.events.len().saturating_sub(n);
        self.events[start..].to_vec()
    }

    /// Recent events as (age, description) rows, oldest first
    pub fn recent_lines(&self, n: usize) -> Vec<(String, String)> {
        self.recent_events(n)
            .iter()
            .map(|event| {
                let age = format!("{} ago", format_duration(event.timestamp().elapsed()));
                (age, event.describe())
            })
            .collect()
    }

    /// Summary lines for the status view
    pub fn summary_lines(&self) -> Vec<(String, String)> {
        let stats = &self.stats;
        vec![
            ("Duration".to_string(), format_duration(self.elapsed())),
            ("Fields edited".to_string(), stats.fields_edited.to_string()),
            ("Attachments".to_string(), stats.attachments_added.saturating_sub(stats.attachments_removed).to_string()),
            ("Items added".to_string(), stats.items_added.to_string()),
            ("Meals committed".to_string(), stats.meals_committed.to_string()),
            ("Calories logged".to_string(), stats.calories_committed.to_string()),
            ("Actions withheld".to_string(), stats.actions_withheld.to_string()),
        ]
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_creation() {
        let collector = TelemetryCollector::new();
        assert_eq!(collector.event_count(), 0);
        assert_eq!(collector.get_stats(), TelemetryStats::default());
    }

    #[test]
    fn test_record_meal_events() {
        let mut collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::ItemAdded {
            name: "Eggs".to_string(),
            calories: 70,
            timestamp: Instant::now(),
        });
        collector.record(TelemetryEvent::MealCommitted {
            items: 1,
            calories: 70,
            timestamp: Instant::now(),
        });

        let stats = collector.get_stats();
        assert_eq!(stats.items_added, 1);
        assert_eq!(stats.meals_committed, 1);
        assert_eq!(stats.calories_committed, 70);
        assert_eq!(collector.event_count(), 2);
    }

    #[test]
    fn test_withheld_actions_counted() {
        let mut collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::ActionWithheld {
            action: "commit".to_string(),
            reason: "empty meal".to_string(),
            timestamp: Instant::now(),
        });
        assert_eq!(collector.get_stats().actions_withheld, 1);
    }

    #[test]
    fn test_recent_events() {
        let mut collector = TelemetryCollector::new();
        for i in 0..10 {
            collector.record(TelemetryEvent::FieldEdited {
                field: format!("field{}", i),
                timestamp: Instant::now(),
            });
        }

        let recent = collector.recent_events(3);
        assert_eq!(recent.len(), 3);
        assert!(matches!(&recent[2], TelemetryEvent::FieldEdited { field, .. } if field == "field9"));
    }

    #[test]
    fn test_recent_lines_describe_events() {
        let mut collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::ItemAdded {
            name: "Apple".to_string(),
            calories: 95,
            timestamp: Instant::now(),
        });
        collector.record(TelemetryEvent::ActionWithheld {
            action: "commit".to_string(),
            reason: "empty meal".to_string(),
            timestamp: Instant::now(),
        });

        let lines = collector.recent_lines(5);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, "0s ago");
        assert_eq!(lines[0].1, "added Apple (95 kcal)");
        assert_eq!(lines[1].1, "commit withheld: empty meal");
        assert_eq!(collector.recent_lines(1).len(), 1);
    }

    #[test]
    fn test_summary_lines() {
        let collector = TelemetryCollector::new();
        let lines = collector.summary_lines();
        assert_eq!(lines[0].0, "Duration");
        assert!(lines.iter().any(|(k, v)| k == "Meals committed" && v == "0"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
