use farm_lib::{AccountView, ExtrapolatedView, RewardTimer, StatsView};
use owo_colors::OwoColorize;

pub const AVOCADO: &str = "🥑";
pub const BANANA: &str = "🍌";
pub const CUCUMBER: &str = "🥒";
pub const NEAR: &str = "Ⓝ";

const FRACTION: usize = 3;

pub fn balances(projected: &ExtrapolatedView) -> String {
    let view = projected.snapshot();
    let mut out = format!(
        "{AVOCADO} {:.FRACTION$}{}  {BANANA} {:.FRACTION$}{}",
        projected.avocado_balance().bright_green(),
        per_day(view.farm.avocado_pixels, AVOCADO),
        projected.banana_balance().bright_yellow(),
        per_day(view.farm.banana_pixels, BANANA),
    );
    out.push_str(&format!(
        "  {CUCUMBER} {:.FRACTION$} ({} share)  {NEAR} {:.FRACTION$}",
        view.reward.cucumber_balance.bright_green(),
        share(view),
        view.wallet_balance,
    ));
    if view.reward.near_balance > 0.0 {
        out.push_str(&format!(
            "  claimable {:.FRACTION$} {NEAR}",
            view.reward.near_balance.bright_magenta().bold()
        ));
    }
    out
}

pub fn rewards(view: &AccountView, stats: &StatsView) -> String {
    let next = view
        .next_reward(stats)
        .map(|next| format!("{next:.6}"))
        .unwrap_or_else(|| "—".to_string());
    format!(
        "Your next reward {NEAR} {}  Total earned {NEAR} {:.6}",
        next.bright_cyan(),
        view.total_earned().bright_cyan()
    )
}

pub fn global_stats(stats: &StatsView) -> String {
    format!(
        "Next reward {NEAR} {:.6}  Total {CUCUMBER} supplied {:.3}  Total {NEAR} rewarded {:.6}  Total {NEAR} claimed {:.6}",
        stats.expected_reward,
        stats.total_supply,
        stats.total_near_rewarded,
        stats.total_near_claimed,
    )
}

pub fn reward_timer(timer: RewardTimer) -> String {
    match timer {
        RewardTimer::UntilNext { .. } => format!("Time until next reward {timer}"),
        RewardTimer::SinceLast { .. } => format!(
            "Time from last reward {}  Use {AVOCADO} to draw a pixel on berry club to distribute {NEAR} rewards.",
            timer.bright_red()
        ),
    }
}

/// Status line of the watch screen. The reward timer shows whether or not
/// someone is signed in.
pub fn dashboard(projected: Option<&ExtrapolatedView>, timer: Option<RewardTimer>) -> String {
    let mut line = projected.map(balances).unwrap_or_default();
    if let Some(timer) = timer {
        if !line.is_empty() {
            line.push_str("  ");
        }
        line.push_str(&reward_timer(timer));
    }
    line
}

fn per_day(pixels: u32, berry: &str) -> String {
    if pixels > 0 {
        format!(" (+{pixels}{berry}/day)")
    } else {
        String::new()
    }
}

fn share(view: &AccountView) -> String {
    match view.reward.percent {
        Some(percent) => format!("{percent:.FRACTION$}%"),
        None => "—".to_string(),
    }
}
