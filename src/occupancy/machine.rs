/// Probabilistic room occupancy state machine and time attribution
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::{PersonTimes, RoomStatus};
use crate::occupancy::ledger::Ledger;
use crate::utils::lock;

/// Time units credited to one occupant per tick
pub const CREDIT_INCREMENT: u64 = 10;

/// Rooms with occupancy tracking and their candidate pools; the first
/// candidate is the initial occupant
pub const OCCUPANCY_ROOMS: [(&str, [&str; 2]); 2] = [
    ("room1", ["Sato", "Yamada"]),
    ("room2", ["Tanaka", "Takahashi"]),
];

/// Which occupant is credited on a tick that hands the room over
///
/// `Outgoing` credits whoever held the room when the tick started.
/// `Incoming` credits the freshly drawn occupant, as the legacy dashboard
/// backend did. Ticks without a handoff behave the same under both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreditPolicy {
    #[default]
    Outgoing,
    Incoming,
}

impl FromStr for CreditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outgoing" => Ok(CreditPolicy::Outgoing),
            "incoming" => Ok(CreditPolicy::Incoming),
            other => Err(format!(
                "Unknown credit policy '{}', expected 'outgoing' or 'incoming'",
                other
            )),
        }
    }
}

/// Transition weights out of `current`
pub fn transition_weights(current: RoomStatus) -> &'static [(RoomStatus, f64)] {
    use RoomStatus::*;
    match current {
        Vacant => &[(Vacant, 0.9), (Working, 0.1)],
        Working => &[(Vacant, 0.1), (Working, 0.6), (Idling, 0.3)],
        Idling => &[(Vacant, 0.1), (Working, 0.4), (Idling, 0.5)],
    }
}

/// Weighted random draw of the status following `current`
pub fn next_status<R: Rng + ?Sized>(current: RoomStatus, rng: &mut R) -> RoomStatus {
    let weights = transition_weights(current);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f64>() * total;

    for &(status, weight) in weights {
        if roll < weight {
            return status;
        }
        roll -= weight;
    }
    // float residue on the upper edge
    weights[weights.len() - 1].0
}

#[derive(Debug, Clone)]
struct RoomOccupancy {
    status: RoomStatus,
    occupant: String,
}

#[derive(Debug)]
struct Room {
    name: String,
    candidates: Vec<String>,
    state: Mutex<RoomOccupancy>,
}

/// What one tick did to one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub room: String,
    pub previous: RoomStatus,
    pub next: RoomStatus,
    /// New occupant when the room changed hands this tick
    pub handoff: Option<String>,
    pub credited: String,
}

/// Consistent view of one room and its current occupant's totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub room: String,
    pub status: RoomStatus,
    pub person: String,
    pub time: Option<PersonTimes>,
}

/// Occupancy state for every tracked room
///
/// Each room has its own lock; ledger credits are taken while holding the
/// room lock, so readers locking room then ledger see a whole tick or none
/// of it.
#[derive(Debug)]
pub struct OccupancyMachine {
    rooms: Vec<Room>,
    ledger: Arc<Ledger>,
    policy: CreditPolicy,
}

impl OccupancyMachine {
    /// Build the machine with every room vacant and held by its first candidate
    ///
    /// Fails when a room has no candidates or a candidate is not in the ledger.
    pub fn new<'a, I>(rooms: I, ledger: Arc<Ledger>, policy: CreditPolicy) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let mut built = Vec::new();
        for (name, candidates) in rooms {
            let first = candidates
                .first()
                .ok_or_else(|| format!("Room {} has no candidate occupants", name))?;
            if let Some(missing) = candidates.iter().find(|c| !ledger.contains(c)) {
                return Err(format!(
                    "Candidate {} for {} is not in the person ledger",
                    missing, name
                ));
            }
            built.push(Room {
                name: name.to_string(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
                state: Mutex::new(RoomOccupancy {
                    status: RoomStatus::Vacant,
                    occupant: first.to_string(),
                }),
            });
        }

        Ok(Self {
            rooms: built,
            ledger,
            policy,
        })
    }

    /// Machine over the default building layout
    pub fn with_default_rooms(ledger: Arc<Ledger>, policy: CreditPolicy) -> Result<Self, String> {
        Self::new(
            OCCUPANCY_ROOMS
                .iter()
                .map(|(name, pool)| (*name, &pool[..])),
            ledger,
            policy,
        )
    }

    /// Advance every room by one tick
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<TickOutcome> {
        self.rooms
            .iter()
            .map(|room| self.apply(room, None, rng))
            .collect()
    }

    /// Force `room` into `next` for one tick instead of drawing it
    ///
    /// # Returns
    /// None if no room has that name
    pub fn transition<R: Rng + ?Sized>(
        &self,
        room: &str,
        next: RoomStatus,
        rng: &mut R,
    ) -> Option<TickOutcome> {
        let room = self.rooms.iter().find(|r| r.name == room)?;
        Some(self.apply(room, Some(next), rng))
    }

    // Draws the next status when `forced` is None.
    fn apply<R: Rng + ?Sized>(
        &self,
        room: &Room,
        forced: Option<RoomStatus>,
        rng: &mut R,
    ) -> TickOutcome {
        let mut state = lock(&room.state);
        let previous = state.status;
        let next = match forced {
            Some(status) => status,
            None => next_status(previous, rng),
        };
        let outgoing = state.occupant.clone();

        // Only a fresh move into vacant hands the room over.
        let handoff = if next == RoomStatus::Vacant && previous != RoomStatus::Vacant {
            room.candidates.choose(rng).cloned()
        } else {
            None
        };
        if let Some(incoming) = &handoff {
            state.occupant = incoming.clone();
        }

        let credited = match self.policy {
            CreditPolicy::Outgoing => outgoing,
            CreditPolicy::Incoming => state.occupant.clone(),
        };
        if self
            .ledger
            .credit(&credited, next.bucket(), CREDIT_INCREMENT)
            .is_none()
        {
            warn!("No ledger entry for {} in {}", credited, room.name);
        }

        state.status = next;

        TickOutcome {
            room: room.name.clone(),
            previous,
            next,
            handoff,
            credited,
        }
    }

    pub fn snapshot(&self, room: &str) -> Option<RoomSnapshot> {
        let room = self.rooms.iter().find(|r| r.name == room)?;
        Some(self.snapshot_room(room))
    }

    pub fn snapshots(&self) -> Vec<RoomSnapshot> {
        self.rooms.iter().map(|r| self.snapshot_room(r)).collect()
    }

    fn snapshot_room(&self, room: &Room) -> RoomSnapshot {
        let state = lock(&room.state);
        RoomSnapshot {
            room: room.name.clone(),
            status: state.status,
            person: state.occupant.clone(),
            time: self.ledger.get(&state.occupant),
        }
    }

    /// Current status of every room, in room order
    pub fn statuses(&self) -> Vec<(String, RoomStatus)> {
        self.rooms
            .iter()
            .map(|r| (r.name.clone(), lock(&r.state).status))
            .collect()
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn policy(&self) -> CreditPolicy {
        self.policy
    }
}

/// Tick the occupancy machine every `period` until cancelled
pub async fn run_occupancy(
    machine: Arc<OccupancyMachine>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut rng = StdRng::from_entropy();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Starting occupancy machine with {:?} credit policy",
        machine.policy()
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                for outcome in machine.tick(&mut rng) {
                    if let Some(incoming) = &outcome.handoff {
                        info!("{} left {}, handed over to {}", outcome.room, outcome.previous, incoming);
                    }
                    debug!(
                        "{}: {} -> {} (credited {})",
                        outcome.room, outcome.previous, outcome.next, outcome.credited
                    );
                }
            }
        }
    }

    info!("Stopped occupancy machine");
}
