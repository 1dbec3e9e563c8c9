//! Incremental route following.
//!
//! A [`RouteFollower`] tracks one moving entity against a shared [`Route`].
//! Each position sample is projected onto a small window of segments around
//! the last confirmed position. Leaving the corridor is terminal: once the
//! follower is [`TrackWindow::Lost`] it never becomes active again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::InvalidRouteError;
use crate::geo::GeoPoint;
use crate::route::Route;

/// Segments currently considered plausible for the tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackWindow {
    /// Inclusive segment index bounds.
    Active {
        min_segment: usize,
        max_segment: usize,
    },
    Lost,
}

impl TrackWindow {
    pub fn is_active(&self) -> bool {
        matches!(self, TrackWindow::Active { .. })
    }

    pub fn bounds(&self) -> Option<(usize, usize)> {
        match *self {
            TrackWindow::Active {
                min_segment,
                max_segment,
            } => Some((min_segment, max_segment)),
            TrackWindow::Lost => None,
        }
    }
}

/// Display state of a followed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Nominal,
    OffCourse,
    Completed,
}

impl CourseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CourseStatus::Nominal => "",
            CourseStatus::OffCourse => "OFF-COURSE",
            CourseStatus::Completed => "COMPLETED",
        }
    }
}

/// Snapshot of a follower for rendering or telemetry consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerReport {
    pub on_path: bool,
    pub reached_destination: bool,
    pub progress: f64,
    pub lateral_distance_ft: f64,
    pub status: CourseStatus,
    pub window: Option<(usize, usize)>,
}

/// Per-entity route following state.
#[derive(Debug, Clone)]
pub struct RouteFollower {
    route: Arc<Route>,
    window: TrackWindow,
    progress: f64,
    lateral_distance_ft: f64,
}

impl RouteFollower {
    /// Start following `route` from its first segment.
    pub fn new(route: Arc<Route>) -> Result<Self, InvalidRouteError> {
        if route.segment_count() == 0 {
            return Err(InvalidRouteError::TooFewVertices {
                needed: 2,
                found: route.vertices().len(),
            });
        }
        Ok(Self {
            route,
            window: TrackWindow::Active {
                min_segment: 0,
                max_segment: 0,
            },
            progress: 0.0,
            lateral_distance_ft: 0.0,
        })
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn window(&self) -> TrackWindow {
        self.window
    }

    /// Furthest confirmed advancement: segment index plus the fractional
    /// position within that segment.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Smallest segment distance found by the latest update, in feet.
    pub fn lateral_distance_ft(&self) -> f64 {
        self.lateral_distance_ft
    }

    /// Point on the route at the current progress.
    pub fn position(&self) -> GeoPoint {
        self.route.interpolate(self.progress)
    }

    pub fn has_stayed_on_path(&self) -> bool {
        self.window.is_active()
    }

    pub fn has_reached_destination(&self) -> bool {
        self.progress >= self.route.segment_count() as f64
    }

    pub fn status(&self) -> CourseStatus {
        if !self.has_stayed_on_path() {
            CourseStatus::OffCourse
        } else if self.has_reached_destination() {
            CourseStatus::Completed
        } else {
            CourseStatus::Nominal
        }
    }

    pub fn report(&self) -> FollowerReport {
        FollowerReport {
            on_path: self.has_stayed_on_path(),
            reached_destination: self.has_reached_destination(),
            progress: self.progress,
            lateral_distance_ft: self.lateral_distance_ft,
            status: self.status(),
            window: self.window.bounds(),
        }
    }

    /// Feed one position sample. Returns whether the entity is still on the
    /// route.
    ///
    /// An active follower scans from its first plausible segment up to one
    /// segment past its last; a lost follower scans the whole route but
    /// stays lost. The new window is the last contiguous run of segments
    /// whose corridor contains the sample.
    pub fn update(&mut self, sample: &GeoPoint) -> bool {
        let last = self.route.segment_count() - 1;
        let (first, limit, previous_max) = match self.window {
            TrackWindow::Lost => (0, last, None),
            TrackWindow::Active {
                min_segment,
                max_segment,
            } => (min_segment, last.min(max_segment + 1), Some(max_segment)),
        };

        let mut lateral_distance_ft = f64::INFINITY;
        let mut run: Option<(usize, usize)> = None;
        let mut prev_within = false;

        for (i, segment) in self.route.segments().enumerate().take(limit + 1).skip(first) {
            let projection = segment.project(sample);
            lateral_distance_ft = lateral_distance_ft.min(projection.distance_ft);

            if segment.accepts(projection.distance_ft) {
                let reached = i as f64 + projection.position;
                if reached > self.progress {
                    self.progress = reached;
                }
                run = match run {
                    Some((min_s, _)) if prev_within => Some((min_s, i)),
                    _ => Some((i, i)),
                };
                prev_within = true;
            } else {
                if previous_max.is_some_and(|max| i > max) {
                    break;
                }
                prev_within = false;
            }
        }

        self.lateral_distance_ft = lateral_distance_ft;
        let was_active = self.window.is_active();
        self.window = match (self.window, run) {
            (TrackWindow::Active { .. }, Some((min_segment, max_segment))) => TrackWindow::Active {
                min_segment,
                max_segment,
            },
            _ => TrackWindow::Lost,
        };

        if was_active && !self.window.is_active() {
            tracing::debug!(
                progress = self.progress,
                lateral_distance_ft,
                "route follower lost track"
            );
        }

        self.window.is_active()
    }
}
