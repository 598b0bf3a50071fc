//! # Kiosk Model
//!
//! The public kiosk shows procedures as numbered cards, eight per page.
//! Tapping a card opens a modal with the procedure's requirements and the
//! counters that attend it; the modal closes by itself after five minutes.
//! A voice guide repeats an invitation every five minutes, and a tap on the
//! guide avatar speaks a short instruction.
//!
//! This module holds the bookkeeping behind that UI so the server can hand
//! the front-end ready-made pages and settings:
//!
//! - [`Pager`] — page count, clamped navigation, range label, arrow visibility.
//! - [`ModalTimer`] — auto-close deadline and the countdown label.
//! - [`GuideLoop`] — when the periodic guide message is due.
//! - [`KioskSettings`] — timings, messages and speech parameters.

use std::ops::Range;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CARDS_PER_PAGE: usize = 8;
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(300);
pub const GUIDE_INTERVAL: Duration = Duration::from_secs(300);
pub const PAGE_TRANSITION: Duration = Duration::from_millis(240);
pub const DETAIL_CACHE_TTL: Duration = Duration::from_secs(120);
pub const GUIDE_BUBBLE_TIMEOUT: Duration = Duration::from_secs(7);

pub const GUIDE_MESSAGE: &str = "Aquí puedes ver todos los trámites de la notaría. \
     Acércate y solicita los requisitos que necesites";
pub const GUIDE_CLICK_MESSAGE: &str =
    "Escoge el trámite que vas a realizar para obtener los requisitos";

// -- Settings -----------------------------------------------------------------

/// Text-to-speech parameters for the on-device voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpeechSettings {
    /// BCP 47 language tag.
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            lang: "es-MX".to_string(),
            rate: 0.97,
            pitch: 1.0,
        }
    }
}

/// Everything the kiosk front-end needs besides the catalog itself.
///
/// Durations travel as milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KioskSettings {
    pub cards_per_page: usize,
    pub modal_timeout_ms: u64,
    pub guide_interval_ms: u64,
    pub page_transition_ms: u64,
    /// How long the front-end may reuse a fetched procedure detail.
    pub detail_cache_ttl_ms: u64,
    pub guide_bubble_timeout_ms: u64,
    pub guide_message: String,
    pub guide_click_message: String,
    pub speech: SpeechSettings,
}

impl Default for KioskSettings {
    fn default() -> Self {
        Self {
            cards_per_page: CARDS_PER_PAGE,
            modal_timeout_ms: millis(MODAL_TIMEOUT),
            guide_interval_ms: millis(GUIDE_INTERVAL),
            page_transition_ms: millis(PAGE_TRANSITION),
            detail_cache_ttl_ms: millis(DETAIL_CACHE_TTL),
            guide_bubble_timeout_ms: millis(GUIDE_BUBBLE_TIMEOUT),
            guide_message: GUIDE_MESSAGE.to_string(),
            guide_click_message: GUIDE_CLICK_MESSAGE.to_string(),
            speech: SpeechSettings::default(),
        }
    }
}

impl KioskSettings {
    pub fn modal_timeout(&self) -> Duration {
        Duration::from_millis(self.modal_timeout_ms)
    }

    pub fn guide_interval(&self) -> Duration {
        Duration::from_millis(self.guide_interval_ms)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// -- Pager --------------------------------------------------------------------

/// Visibility of the previous/next page arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavButtons {
    pub prev: bool,
    pub next: bool,
}

/// Page cursor over `total` cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    per_page: usize,
    current: usize,
}

impl Pager {
    /// Pager positioned on the first page. A zero page size is treated as one.
    pub fn new(total: usize, per_page: usize) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
            current: 0,
        }
    }

    /// Pager positioned on `page`, clamped to the last page.
    pub fn at(total: usize, per_page: usize, page: usize) -> Self {
        let mut pager = Self::new(total, per_page);
        pager.current = page.min(pager.page_count().saturating_sub(1));
        pager
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.per_page)
    }

    /// Move by `direction` pages, clamped to the valid range.
    ///
    /// Returns the new page, or `None` when nothing moved (single page,
    /// or already at the edge).
    pub fn change(&mut self, direction: isize) -> Option<usize> {
        let pages = self.page_count();
        if pages <= 1 {
            return None;
        }
        let target = self
            .current
            .saturating_add_signed(direction)
            .min(pages - 1);
        if target == self.current {
            return None;
        }
        self.current = target;
        Some(target)
    }

    /// Slice bounds of the current page within the full card list.
    pub fn page_bounds(&self) -> Range<usize> {
        let start = (self.current * self.per_page).min(self.total);
        let end = (start + self.per_page).min(self.total);
        start..end
    }

    /// 1-based card number of the `index`-th card on the current page.
    pub fn card_number(&self, index: usize) -> usize {
        self.page_bounds().start + index + 1
    }

    /// `"start-end / total"`, 1-based and inclusive; `"0-0 / 0"` when empty.
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "0-0 / 0".to_string();
        }
        let bounds = self.page_bounds();
        format!("{}-{} / {}", bounds.start + 1, bounds.end, self.total)
    }

    /// Arrow visibility. Both arrows hide while the modal is open or when
    /// everything fits on one page.
    pub fn nav(&self, modal_open: bool) -> NavButtons {
        let pages = self.page_count();
        if modal_open || pages <= 1 {
            return NavButtons {
                prev: false,
                next: false,
            };
        }
        NavButtons {
            prev: self.current > 0,
            next: self.current < pages - 1,
        }
    }
}

// -- Modal timer --------------------------------------------------------------

/// Auto-close deadline of the requirements modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalTimer {
    deadline: Instant,
}

impl ModalTimer {
    pub fn open(now: Instant, timeout: Duration) -> Self {
        Self {
            deadline: now + timeout,
        }
    }

    /// Whole seconds left, rounded up, never below zero.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let ms = self.deadline.saturating_duration_since(now).as_millis();
        u64::try_from(ms.div_ceil(1000)).unwrap_or(u64::MAX)
    }

    pub fn label(&self, now: Instant) -> String {
        format!("Cierra en {}s", self.remaining_secs(now))
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

// -- Guide loop ---------------------------------------------------------------

/// Schedule of the periodic voice guide.
///
/// The guide speaks as soon as the kiosk starts and then once per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideLoop {
    interval: Duration,
    next_due: Option<Instant>,
}

impl GuideLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Start the loop; the first message is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn started(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|at| now >= at)
    }

    /// Record that the message was spoken at `now`.
    pub fn mark_spoken(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }
}
