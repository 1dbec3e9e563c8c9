//! Replay of recorded position polls against a route.
//!
//! Each poll is a snapshot of every visible entity, keyed by name:
//!
//! ```json
//! {"D-EABC": {"lat": 47.2589, "lon": 11.3317, "alt": 1907.0}}
//! ```
//!
//! Every entity gets its own [`RouteFollower`]. The first time an entity
//! goes off course or completes the route, that status and the elapsed time
//! are latched for the rest of its flight.

use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use corridor_core::{CourseStatus, GeoPoint, InvalidRouteError, Route, RouteFollower};

use crate::config::Config;

/// One recorded snapshot of entity positions.
pub type Poll = BTreeMap<String, GeoPoint>;

/// Final state of one tracked flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub status: CourseStatus,
    pub label: &'static str,
    pub elapsed_secs: f64,
    pub progress: f64,
    pub lateral_distance_ft: f64,
    pub samples: u64,
}

#[derive(Debug)]
struct TrackedEntity {
    follower: RouteFollower,
    last_sample: GeoPoint,
    first_poll: u64,
    polls_since_sample: u32,
    samples: u64,
    latched: Option<(CourseStatus, u64)>,
}

impl TrackedEntity {
    fn new(route: Arc<Route>, sample: GeoPoint, poll: u64) -> Result<Self, InvalidRouteError> {
        Ok(Self {
            follower: RouteFollower::new(route)?,
            last_sample: sample,
            first_poll: poll,
            polls_since_sample: 0,
            samples: 0,
            latched: None,
        })
    }

    fn observe(&mut self, entity: &str, sample: GeoPoint, poll: u64, config: &Config) {
        self.last_sample = sample;
        self.polls_since_sample = 0;
        self.samples += 1;
        self.follower.update(&sample);

        if self.latched.is_some() {
            return;
        }
        let status = self.follower.status();
        if status == CourseStatus::Nominal {
            return;
        }
        self.latched = Some((status, poll));

        let elapsed_secs = self.elapsed_secs(poll, config);
        match status {
            CourseStatus::OffCourse => tracing::warn!(
                entity,
                elapsed_secs,
                lateral_distance_ft = self.follower.lateral_distance_ft(),
                "entity went off course"
            ),
            CourseStatus::Completed => {
                tracing::info!(entity, elapsed_secs, "entity completed the route")
            }
            CourseStatus::Nominal => {}
        }
    }

    fn elapsed_secs(&self, current_poll: u64, config: &Config) -> f64 {
        let end = self.latched.map_or(current_poll, |(_, poll)| poll);
        end.saturating_sub(self.first_poll) as f64 * config.poll_period_secs
    }

    fn summary(&self, entity: &str, current_poll: u64, config: &Config) -> EntitySummary {
        let status = self
            .latched
            .map_or(CourseStatus::Nominal, |(status, _)| status);
        EntitySummary {
            entity: entity.to_string(),
            status,
            label: status.label(),
            elapsed_secs: self.elapsed_secs(current_poll, config),
            progress: self.follower.progress(),
            lateral_distance_ft: self.follower.lateral_distance_ft(),
            samples: self.samples,
        }
    }
}

/// Drives one follower per observed entity through a sequence of polls.
#[derive(Debug)]
pub struct Replay {
    route: Arc<Route>,
    config: Config,
    entities: HashMap<String, TrackedEntity>,
    finished: Vec<EntitySummary>,
    poll: u64,
}

impl Replay {
    pub fn new(route: Arc<Route>, config: Config) -> Result<Self, InvalidRouteError> {
        // fail early rather than on the first sample
        RouteFollower::new(route.clone())?;
        Ok(Self {
            route,
            config,
            entities: HashMap::new(),
            finished: Vec::new(),
            poll: 0,
        })
    }

    /// Feed one poll snapshot.
    pub fn observe(&mut self, poll: &Poll) -> Result<(), InvalidRouteError> {
        let current = self.poll;
        self.forget_stale(current);

        for (entity, sample) in poll {
            let reacquire = match self.entities.get(entity) {
                None => true,
                Some(tracked) => {
                    tracked.last_sample.distance(sample) > self.config.reacquire_distance_ft
                }
            };

            if reacquire {
                let fresh = TrackedEntity::new(self.route.clone(), *sample, current)?;
                if let Some(previous) = self.entities.insert(entity.clone(), fresh) {
                    tracing::debug!(entity = %entity, "position jump, starting a new flight");
                    self.finished
                        .push(previous.summary(entity, current, &self.config));
                } else {
                    tracing::debug!(entity = %entity, "tracking new entity");
                }
            }

            if let Some(tracked) = self.entities.get_mut(entity) {
                tracked.observe(entity, *sample, current, &self.config);
            }
        }

        self.poll += 1;
        Ok(())
    }

    /// Age every entity by one poll and drop those that reached the stale
    /// limit, in name order. A sample in this poll resets the age.
    fn forget_stale(&mut self, current: u64) {
        let limit = self.config.stale_after_polls;
        let mut stale: Vec<String> = self
            .entities
            .iter_mut()
            .filter_map(|(entity, tracked)| {
                tracked.polls_since_sample += 1;
                (tracked.polls_since_sample >= limit).then(|| entity.clone())
            })
            .collect();
        stale.sort();

        for entity in stale {
            if let Some(tracked) = self.entities.remove(&entity) {
                tracing::debug!(entity = %entity, "entity timed out");
                self.finished
                    .push(tracked.summary(&entity, current, &self.config));
            }
        }
    }

    /// Read newline separated JSON polls and feed each one.
    pub fn observe_lines<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading poll line {}", index + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let poll: Poll = serde_json::from_str(&line)
                .with_context(|| format!("parsing poll line {}", index + 1))?;
            self.observe(&poll)?;
        }
        Ok(())
    }

    /// Current status of a tracked entity, if it is still tracked.
    pub fn status(&self, entity: &str) -> Option<CourseStatus> {
        self.entities
            .get(entity)
            .map(|tracked| tracked.summary(entity, self.poll, &self.config).status)
    }

    pub fn tracked(&self) -> usize {
        self.entities.len()
    }

    /// Summaries of every flight, finished ones first, then still tracked
    /// entities in name order.
    pub fn finish(self) -> Vec<EntitySummary> {
        let Replay {
            entities,
            mut finished,
            config,
            poll,
            ..
        } = self;
        let mut remaining: Vec<_> = entities.into_iter().collect();
        remaining.sort_by(|a, b| a.0.cmp(&b.0));
        let current = poll.saturating_sub(1);
        finished.extend(
            remaining
                .iter()
                .map(|(entity, tracked)| tracked.summary(entity, current, &config)),
        );
        finished
    }
}
