use crate::message::{Block, Message};
use crate::request::{display_or, DigestData, GoalData, Notification, Request, SpikeData};
use crate::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use notify_sql::Site;

/// Render the message of a `request` for `site`, sent at `now`.
/// Fails only if the request names no known notification kind.
pub fn render(request: &Request, site: &Site, now: DateTime<Utc>) -> Result<Message, Error> {
    Ok(Notification::from_request(request)?.render(site, now))
}

impl Notification {
    pub fn render(&self, site: &Site, now: DateTime<Utc>) -> Message {
        match self {
            Notification::Test => render_test(site, now),
            Notification::DailyDigest(data) => render_digest(site, data),
            Notification::GoalCompleted(data) => render_goal(site, data),
            Notification::TrafficSpike(data) => render_spike(site, data),
        }
    }
}

fn site_name(site: &Site) -> &str {
    site.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unknown")
}

fn site_domain<'s>(site: &'s Site, fallback: &'s str) -> &'s str {
    site.domain
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(fallback)
}

fn render_test(site: &Site, now: DateTime<Utc>) -> Message {
    let fallback_name = site
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("your site");

    Message {
        text: format!("🧪 Test notification from {fallback_name}"),
        blocks: vec![
            Block::section(format!(
                "*🧪 Test Notification*\n\nThis is a test message from your analytics dashboard.\n\n*Site:* {}\n*Domain:* {}",
                site_name(site),
                site_domain(site, "Not set"),
            )),
            Block::context(format!(
                "Sent at {}",
                now.to_rfc3339_opts(SecondsFormat::Millis, true)
            )),
        ],
    }
}

fn render_digest(site: &Site, data: &DigestData) -> Message {
    let name = site_name(site);

    Message {
        text: format!("📊 Daily Analytics Digest for {name}"),
        blocks: vec![
            Block::header("📊 Daily Analytics Digest"),
            Block::section(format!(
                "*{name}*\n{}",
                site_domain(site, "No domain set")
            )),
            Block::fields([
                format!("*Visitors*\n{}", display_or(&data.visitors, "0")),
                format!("*Page Views*\n{}", display_or(&data.pageviews, "0")),
                format!("*Bounce Rate*\n{}%", display_or(&data.bounce_rate, "0")),
                format!("*Avg. Duration*\n{}", display_or(&data.avg_duration, "0s")),
            ]),
        ],
    }
}

fn render_goal(site: &Site, data: &GoalData) -> Message {
    let goal = display_or(&data.goal_name, "Unknown");

    Message {
        text: format!("🎯 Goal Achieved: {goal}"),
        blocks: vec![Block::section(format!(
            "*🎯 Goal Achieved!*\n\n*Goal:* {goal}\n*Conversions:* {}\n*Site:* {}",
            display_or(&data.conversions, "0"),
            site_name(site),
        ))],
    }
}

fn render_spike(site: &Site, data: &SpikeData) -> Message {
    let name = site_name(site);

    Message {
        text: format!("🚀 Traffic Spike Detected on {name}"),
        blocks: vec![Block::section(format!(
            "*🚀 Traffic Spike Detected!*\n\n*Site:* {name}\n*Current Visitors:* {}\n*Normal Average:* {}\n*Increase:* {}%",
            display_or(&data.current_visitors, "0"),
            display_or(&data.average_visitors, "0"),
            display_or(&data.increase_percent, "0"),
        ))],
    }
}
