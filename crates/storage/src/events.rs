// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bucket: registered triggers, deleted on consumption.

use crate::db::{Database, StoreError};
use lwf_core::{codec, EventId, EventPillar, WorkflowEvent};
use tracing::error;

const TABLE: &str = "EventStore";

impl Database {
    /// Persist a trigger registration under its variant's pillar.
    pub async fn put_event(&self, event: &WorkflowEvent) -> Result<(), StoreError> {
        let blob = codec::encode(event)?;
        self.put(
            TABLE,
            event.fire_site(),
            event.pillar().as_str(),
            event.event_id().as_str(),
            &blob,
        )
        .await
    }

    /// All registered events for one pillar, newest first.
    pub fn events(&self, pillar: EventPillar) -> Vec<WorkflowEvent> {
        self.read_events(Some(pillar))
    }

    /// All registered events across every pillar, newest first.
    pub fn all_events(&self) -> Vec<WorkflowEvent> {
        self.read_events(None)
    }

    fn read_events(&self, pillar: Option<EventPillar>) -> Vec<WorkflowEvent> {
        let result = self.reading(|conn| {
            let mut out = Vec::new();
            match pillar {
                Some(p) => {
                    let mut stmt = conn.prepare(
                        "SELECT data FROM EventStore WHERE pillar = ?1 ORDER BY ts DESC, id DESC",
                    )?;
                    let rows = stmt.query_map([p.as_str()], |r| r.get::<_, String>(0))?;
                    for row in rows {
                        out.push(codec::decode(&row?)?);
                    }
                }
                None => {
                    let mut stmt =
                        conn.prepare("SELECT data FROM EventStore ORDER BY ts DESC, id DESC")?;
                    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
                    for row in rows {
                        out.push(codec::decode(&row?)?);
                    }
                }
            }
            Ok(out)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "read_events failed");
                Vec::new()
            }
        }
    }

    /// Delete an event across all event pillars. Returns true if a row was
    /// removed; the caller that observes true owns the (single) fire.
    pub async fn delete_event(&self, event_id: &EventId) -> Result<bool, StoreError> {
        self.retrying(|conn| {
            let n = conn.execute(
                "DELETE FROM EventStore WHERE key = ?1 AND pillar LIKE 'run.event.%'",
                [event_id.as_str()],
            )?;
            Ok(n > 0)
        })
        .await
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
