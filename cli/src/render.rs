//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use client::util::set_status::SetStatus;
use client::{Toast, ToastLevel};
use wire::{
    ActionCheck, AnalysisStarted, AnalysisTask, BuildStatus, ChannelsSet, CreditBalance, CreditCost, CreditPackage,
    Filter, ParsingStatus, TransactionPage,
};

pub fn toast(toast: &Toast) -> String {
    let tag = match toast.level {
        ToastLevel::Info => "info",
        ToastLevel::Success => "ok",
        ToastLevel::Error => "error",
    };
    match &toast.description {
        Some(description) => format!("{tag}: {}: {description}", toast.title),
        None => format!("{tag}: {}", toast.title),
    }
}

pub fn tasks(tasks: &[AnalysisTask]) -> String {
    if tasks.is_empty() {
        return "no tasks".to_owned();
    }
    tasks
        .iter()
        .map(|t| {
            format!(
                "{:<24} {:<10} {:>5.1}%  {} channel(s)",
                t.id,
                t.status.as_str(),
                t.progress,
                t.channels.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn task_detail(task: &AnalysisTask) -> String {
    let mut out = format!("task {}: {} ({:.1}%)", task.id, task.status, task.progress);
    if let Some(error) = &task.error {
        let _ = write!(out, "\n  error: {error}");
    }
    for (channel, score) in task.top_scores() {
        let _ = write!(out, "\n  {channel:<32} {score:.2}");
    }
    out
}

pub fn started(started: &AnalysisStarted) -> String {
    match &started.message {
        Some(message) => format!("started task {} ({}): {message}", started.task_id, started.status),
        None => format!("started task {} ({})", started.task_id, started.status),
    }
}

pub fn sets(sets: &[ChannelsSet]) -> String {
    if sets.is_empty() {
        return "no channel sets".to_owned();
    }
    sets.iter()
        .map(|s| format!("{:<24} {:<32} {}", s.id, s.name, SetStatus::of(s)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn set_detail(set: &ChannelsSet) -> String {
    let mut out = format!("{} ({}): {}", set.name, set.id, SetStatus::of(set));
    if let Some(description) = set.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "\n  {description}");
    }
    for channel in &set.channels {
        let status = serde_json::to_value(channel.parse_status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        let _ = write!(out, "\n  @{:<31} {status}", channel.username);
    }
    out
}

pub fn parsing(status: &ParsingStatus) -> String {
    format!(
        "{}/{} parsed, {} pending, {} failed{}",
        status.parsed,
        status.total,
        status.pending,
        status.failed,
        if status.all_parsed { " (ready)" } else { "" }
    )
}

pub fn build(status: &BuildStatus) -> String {
    let state = serde_json::to_value(status.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    match &status.message {
        Some(message) => format!("{state} ({:.1}%): {message}", status.progress),
        None => format!("{state} ({:.1}%)", status.progress),
    }
}

pub fn balance(balance: &CreditBalance) -> String {
    format!(
        "balance: {} (purchased {}, spent {})",
        balance.balance, balance.total_purchased, balance.total_spent
    )
}

pub fn transactions(page: &TransactionPage) -> String {
    if page.items.is_empty() {
        return "no transactions".to_owned();
    }
    let mut out = page
        .items
        .iter()
        .map(|t| {
            format!(
                "{:<20} {:>+8}  {}",
                t.created_at.as_deref().unwrap_or("-"),
                t.amount,
                t.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let _ = write!(out, "\n{} of {} shown", page.items.len(), page.total);
    out
}

pub fn packages(packages: &[CreditPackage]) -> String {
    packages
        .iter()
        .map(|p| {
            let popular = if p.is_popular { " *" } else { "" };
            format!(
                "{:<16} {:<20} {:>6} credits  {:.2} {}{popular}",
                p.id,
                p.name,
                p.total_credits(),
                p.price,
                p.currency
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn costs(costs: &[CreditCost]) -> String {
    costs
        .iter()
        .map(|c| format!("{:<24} {:>4}", c.action_type, c.cost))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn action_check(check: &ActionCheck) -> String {
    if check.can_perform {
        format!("{}: allowed ({} of {} credits)", check.action_type, check.required_credits, check.current_balance)
    } else {
        format!(
            "{}: not enough credits (needs {}, have {})",
            check.action_type, check.required_credits, check.current_balance
        )
    }
}

pub fn filters(filters: &[Filter]) -> String {
    if filters.is_empty() {
        return "no filters".to_owned();
    }
    filters
        .iter()
        .map(|f| {
            let kind = if f.is_system { "system" } else { "user" };
            format!("{:<24} {:<6} {:<12} {}", f.id, kind, f.category, f.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
