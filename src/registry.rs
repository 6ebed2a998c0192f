//!
//! Activity registry
//! -----------------
//! In-memory catalog of extracurricular activities and their participants.
//! The catalog is seeded once at process start; activities are never created
//! or deleted afterwards, only each activity's participant list mutates.
//!
//! Reads are unrestricted and return snapshot copies. Mutations require a
//! verified teacher [`Principal`], supplied by the caller; the registry does
//! not re-verify tokens, it only records who acted. Because signup and
//! unregister are check-then-write sequences over shared state, all access
//! goes through the registry-wide lock in [`SharedRegistry`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::identity::Principal;

/// A single extracurricular offering.
///
/// `max_participants` is carried for the wire format and round-trips
/// unchanged; signup does not check it against the roster size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    /// Participant emails in signup order.
    pub participants: Vec<String>,
}

/// Mutable catalog keyed by activity name.
pub struct Registry {
    activities: BTreeMap<String, Activity>,
}

impl Registry {
    pub fn new() -> Self {
        Self { activities: BTreeMap::new() }
    }

    /// The built-in Mergington High School catalog.
    pub fn seeded() -> Self {
        fn activity(description: &str, schedule: &str, max_participants: u32, participants: &[&str]) -> Activity {
            Activity {
                description: description.to_string(),
                schedule: schedule.to_string(),
                max_participants,
                participants: participants.iter().map(|p| p.to_string()).collect(),
            }
        }

        let mut activities = BTreeMap::new();
        activities.insert(
            "Chess Club".to_string(),
            activity(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
                &["michael@mergington.edu", "daniel@mergington.edu"],
            ),
        );
        activities.insert(
            "Programming Class".to_string(),
            activity(
                "Learn programming fundamentals and build software projects",
                "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
                20,
                &["emma@mergington.edu", "sophia@mergington.edu"],
            ),
        );
        activities.insert(
            "Gym Class".to_string(),
            activity(
                "Physical education and sports activities",
                "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
                30,
                &["john@mergington.edu", "olivia@mergington.edu"],
            ),
        );
        activities.insert(
            "Soccer Team".to_string(),
            activity(
                "Join the school soccer team and compete in matches",
                "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
                22,
                &["liam@mergington.edu", "noah@mergington.edu"],
            ),
        );
        activities.insert(
            "Basketball Team".to_string(),
            activity(
                "Practice and play basketball with the school team",
                "Wednesdays and Fridays, 3:30 PM - 5:00 PM",
                15,
                &["ava@mergington.edu", "mia@mergington.edu"],
            ),
        );
        activities.insert(
            "Art Club".to_string(),
            activity(
                "Explore your creativity through painting and drawing",
                "Thursdays, 3:30 PM - 5:00 PM",
                15,
                &["amelia@mergington.edu", "harper@mergington.edu"],
            ),
        );
        activities.insert(
            "Drama Club".to_string(),
            activity(
                "Act, direct, and produce plays and performances",
                "Mondays and Wednesdays, 4:00 PM - 5:30 PM",
                20,
                &["ella@mergington.edu", "scarlett@mergington.edu"],
            ),
        );
        activities.insert(
            "Math Club".to_string(),
            activity(
                "Solve challenging problems and participate in math competitions",
                "Tuesdays, 3:30 PM - 4:30 PM",
                10,
                &["james@mergington.edu", "benjamin@mergington.edu"],
            ),
        );
        activities.insert(
            "Debate Team".to_string(),
            activity(
                "Develop public speaking and argumentation skills",
                "Fridays, 4:00 PM - 5:30 PM",
                12,
                &["charlotte@mergington.edu", "henry@mergington.edu"],
            ),
        );
        Self { activities }
    }

    /// Snapshot of the full catalog.
    pub fn list(&self) -> BTreeMap<String, Activity> {
        self.activities.clone()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Enroll `email` in the named activity. Any string is accepted as an
    /// email identifier; format is not validated.
    pub fn signup(&mut self, name: &str, email: &str, who: &Principal) -> AppResult<String> {
        let Some(activity) = self.activities.get_mut(name) else {
            return Err(AppError::not_found("activity_not_found", "Activity not found"));
        };
        if activity.participants.iter().any(|p| p == email) {
            return Err(AppError::conflict("already_signed_up", "Student is already signed up"));
        }
        activity.participants.push(email.to_string());
        info!(target: "registry", "signup activity={} email={} by={}", name, email, who.username);
        Ok(format!("Signed up {} for {}", email, name))
    }

    /// Remove `email` from the named activity.
    pub fn unregister(&mut self, name: &str, email: &str, who: &Principal) -> AppResult<String> {
        let Some(activity) = self.activities.get_mut(name) else {
            return Err(AppError::not_found("activity_not_found", "Activity not found"));
        };
        let Some(pos) = activity.participants.iter().position(|p| p == email) else {
            return Err(AppError::conflict("not_signed_up", "Student is not signed up for this activity"));
        };
        activity.participants.remove(pos);
        info!(target: "registry", "unregister activity={} email={} by={}", name, email, who.username);
        Ok(format!("Unregistered {} from {}", email, name))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle shared across request handlers. Every operation takes
/// the registry-wide lock, which serializes the check-then-write sequences
/// of concurrent mutations.
#[derive(Clone)]
pub struct SharedRegistry(pub Arc<Mutex<Registry>>);

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self(Arc::new(Mutex::new(registry)))
    }

    pub fn seeded() -> Self {
        Self::new(Registry::seeded())
    }
}
