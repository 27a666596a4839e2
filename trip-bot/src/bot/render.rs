//! Screens of the booking conversation.
//!
//! Plain text only: no markup, so station names never need escaping.

use std::fmt::Write;

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::domain::{ScheduleOption, Station, Trip, REMINDER_LEAD_MINS};
use crate::schedule::{self, page_bounds, total_pages};
use crate::session::Session;
use crate::stations::StationDirectory;

use super::command::{Command, StationRef};
use super::reply::{Button, Keyboard, Reply, ReplyMode};

/// Recent stations offered on the picker.
pub const RECENT_SHOWN: usize = 3;

/// Popular stations offered on the picker.
pub const POPULAR_SHOWN: usize = 7;

/// Which end of the trip a screen is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    From,
    To,
}

pub fn welcome(name: &str) -> Reply {
    Reply::send(format!(
        "👋 Hi, {name}!\n\n\
         I help you plan suburban train trips and remind you {REMINDER_LEAD_MINS} minutes \
         before departure.\n\n\
         /newtrip - plan a trip\n\
         /mytrips - your trips\n\
         /help - help"
    ))
}

pub fn help() -> Reply {
    Reply::send(format!(
        "ℹ️ How it works\n\n\
         1. /newtrip and pick the departure station\n\
         2. Pick the destination station\n\
         3. Choose a train from the schedule\n\n\
         You get a reminder {REMINDER_LEAD_MINS} minutes before the train leaves.\n\n\
         /mytrips - list your trips\n\
         /cancel - stop planning"
    ))
}

/// Shown when text arrives and no station is being typed.
pub fn not_started() -> Reply {
    Reply::send("To plan a trip use /newtrip\nFor help: /help")
}

pub fn cancelled() -> Reply {
    Reply::edit("❌ Trip planning cancelled\n\nStart again with /newtrip")
}

/// Station selection with recent and popular buttons.
pub fn station_picker(session: &Session, stations: &StationDirectory, leg: Leg) -> Reply {
    let text = match leg {
        Leg::From => "📍 Choose the departure station\n\nPick a recent or popular one:",
        Leg::To => "📍 Choose the destination station\n\nPick a recent or popular one:",
    };

    let mut keyboard: Keyboard = Vec::new();

    for (i, station) in session.recent().iter().take(RECENT_SHOWN).enumerate() {
        keyboard.push(vec![Button::new(
            format!("🕒 {}", station.name),
            Command::SelectStation(StationRef::Recent(i)),
        )]);
    }

    for (i, station) in stations.popular(POPULAR_SHOWN).iter().enumerate() {
        keyboard.push(vec![Button::new(
            format!("📍 {}", station.name),
            Command::SelectStation(StationRef::Popular(i)),
        )]);
    }

    keyboard.push(vec![Button::new("⌨️ Type a name", Command::ManualEntry)]);

    let mut nav = Vec::new();
    if leg == Leg::To {
        nav.push(Button::new("◀️ Back", Command::Back));
    }
    nav.push(Button::new("❌ Cancel", Command::Cancel));
    keyboard.push(nav);

    Reply::send(text).with_keyboard(keyboard)
}

/// Prompt for typing a station.
pub fn manual_prompt(leg: Leg) -> Reply {
    let text = match leg {
        Leg::From => "⌨️ Type the name or code of the departure station\n\nFor example: Taganrog or s9613483",
        Leg::To => "⌨️ Type the name or code of the destination station\n\nFor example: Rostov or s9612913",
    };
    Reply::send(text)
}

/// Confirmation of a typed departure station, asking for the destination.
pub fn origin_accepted(origin: &Station) -> Reply {
    Reply::send(format!(
        "✅ Departure station: {}\n\n\
         Step 2 of 3: type the destination station\n\n\
         You can enter:\n\
         • a station code (for example: s9612913)\n\
         • a station name (for example: Rostov)\n\n\
         To stop, send /cancel",
        origin.name
    ))
}

/// A failure the user can recover from, with the actions offered in rows
/// of two.
pub fn recoverable(message: &str, actions: Vec<Button>) -> Reply {
    let keyboard = actions.chunks(2).map(|row| row.to_vec()).collect();
    Reply::send(format!("⚠️ {message}\n\nWhat next?")).with_keyboard(keyboard)
}

/// Actions offered when a schedule search came back empty or failed.
pub fn search_actions() -> Vec<Button> {
    vec![
        Button::new("🔄 Try again", Command::Retry),
        Button::new("🔀 Other stations", Command::EditFrom),
        Button::new("❌ Cancel", Command::Cancel),
    ]
}

/// The schedule screen for the session's current page.
///
/// Results found on a later day than the one asked for carry a note naming
/// that day.
pub fn schedule(session: &Session, offset: FixedOffset, mode: ReplyMode) -> Reply {
    let mut text = schedule_text(
        session.results(),
        session.from_label(),
        session.to_label(),
        offset,
    );

    let asked = session.date.with_timezone(&offset).date_naive();
    let shown = session.results_from().with_timezone(&offset).date_naive();
    if shown > asked {
        text = format!(
            "📅 No trains left on {}, showing {}\n\n{text}",
            asked.format("%d.%m.%Y"),
            shown.format("%d.%m.%Y")
        );
    }

    Reply::send(text)
        .with_keyboard(schedule_keyboard(session.results(), session.page(), offset))
        .with_mode(mode)
}

/// Every option, numbered, with times in the local offset.
pub fn schedule_text(
    options: &[ScheduleOption],
    from: &str,
    to: &str,
    offset: FixedOffset,
) -> String {
    let mut out = String::from("🚆 Train schedule\n\n");
    let _ = write!(out, "📍 {from} → {to}\n\n");
    out.push_str("Choose a train:\n\n");

    for (i, opt) in options.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, clean_title(&opt.title));
        let _ = writeln!(out, "   🚆 Train: {}", opt.train_number);
        let _ = writeln!(
            out,
            "   🕒 {} → {}",
            format_date_time(opt.departure, offset),
            format_time(opt.arrival, offset)
        );
        let _ = write!(out, "   ⏱ {}\n\n", human_duration(opt.duration));
    }

    out
}

/// Train buttons for one page, the pager row when there is more than one
/// page, then the actions row.
pub fn schedule_keyboard(options: &[ScheduleOption], page: usize, offset: FixedOffset) -> Keyboard {
    let mut keyboard: Keyboard = Vec::new();

    for i in page_bounds(options.len(), page) {
        let opt = &options[i];
        keyboard.push(vec![Button::new(
            format!(
                "🚆 {} | {} → {} ({})",
                opt.train_number,
                format_time(opt.departure, offset),
                format_time(opt.arrival, offset),
                human_duration(opt.duration)
            ),
            Command::SelectTrain(i),
        )]);
    }

    let pages = total_pages(options.len());
    if pages > 1 {
        let mut nav = Vec::new();
        if schedule::has_prev(page) {
            nav.push(Button::new("◀️", Command::SchedulePage(page - 1)));
        }
        nav.push(Button::new(format!("{}/{}", page + 1, pages), Command::Noop));
        if schedule::has_next(options.len(), page) {
            nav.push(Button::new("▶️", Command::SchedulePage(page + 1)));
        }
        keyboard.push(nav);
    }

    keyboard.push(vec![
        Button::new("◀️ Back", Command::Back),
        Button::new("✏️ Change", Command::EditFrom),
        Button::new("❌ Cancel", Command::Cancel),
    ]);

    keyboard
}

pub fn trip_created(
    option: &ScheduleOption,
    from: &str,
    to: &str,
    offset: FixedOffset,
) -> Reply {
    Reply::edit(format!(
        "✅ Trip created!\n\n\
         📋 Details:\n\
         🚆 Train: {}\n\
         📍 Route: {from} → {to}\n\
         🕒 Departure: {}\n\n\
         I will remind you {REMINDER_LEAD_MINS} minutes before departure. Have a good trip! 🚂",
        option.train_number,
        format_date_time(option.departure, offset)
    ))
}

pub fn trip_list(trips: &[Trip], stations: &StationDirectory, offset: FixedOffset) -> Reply {
    if trips.is_empty() {
        return Reply::send("📭 You have no trips yet.\n\nPlan one with /newtrip");
    }

    let mut out = String::from("🗓 Your trips:\n\n");
    for trip in trips {
        let _ = writeln!(
            out,
            "#{} {} → {}",
            trip.id,
            stations.label(&trip.from),
            stations.label(&trip.to)
        );
        let _ = write!(out, "   🕒 {}\n\n", format_date_time(trip.departure, offset));
    }
    Reply::send(out)
}

/// Human-readable travel time: `45 s`, `12 min`, `2h (120 min)`,
/// `1h 5m (65 min)`.
pub fn human_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    if secs < 60 {
        return format!("{secs} s");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins} min");
    }
    let (h, m) = (mins / 60, mins % 60);
    if m == 0 {
        format!("{h}h ({mins} min)")
    } else {
        format!("{h}h {m}m ({mins} min)")
    }
}

fn format_date_time(t: DateTime<Utc>, offset: FixedOffset) -> String {
    t.with_timezone(&offset).format("%d.%m.%Y %H:%M").to_string()
}

fn format_time(t: DateTime<Utc>, offset: FixedOffset) -> String {
    t.with_timezone(&offset).format("%H:%M").to_string()
}

/// Strip markup characters some providers leave in titles.
fn clean_title(title: &str) -> String {
    title.replace(['\\', '*'], "")
}
