use chrono::Weekday;

use super::{Document, Error};
use crate::{
    backend::{ScheduleRequest, ScheduleSetRequest, StopLookup},
    model::{
        Schedule, ScheduleException, ScheduleStatus, ScheduleType, ScheduleWorkspaceData,
    },
    validate::{ValidationReport, validate_schedules},
    yaml::{self, ScheduleWorkspacePatch},
};

/// Form edits on a set of schedules. `schedule` indexes `schedules`,
/// `stop` and `exception` index into that schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleEdit {
    SelectRoute(Option<String>),
    /// Adds a blank schedule for the selected route.
    AddSchedule,
    RemoveSchedule(usize),
    Name {
        schedule: usize,
        value: String,
    },
    Type {
        schedule: usize,
        schedule_type: ScheduleType,
    },
    Status {
        schedule: usize,
        status: ScheduleStatus,
    },
    Dates {
        schedule: usize,
        start: String,
        end: String,
    },
    Description {
        schedule: usize,
        value: String,
    },
    GenerateTrips {
        schedule: usize,
        enabled: bool,
    },
    Day {
        schedule: usize,
        day: Weekday,
        active: bool,
    },
    AddException {
        schedule: usize,
        exception: ScheduleException,
    },
    RemoveException {
        schedule: usize,
        exception: usize,
    },
    StopTimes {
        schedule: usize,
        stop: usize,
        arrival: String,
        departure: String,
    },
}

fn schedule_mut(data: &mut ScheduleWorkspaceData, index: usize) -> Result<&mut Schedule, Error> {
    data.schedules.get_mut(index).ok_or(Error::OutOfRange {
        what: "schedule",
        index,
    })
}

impl Document for ScheduleWorkspaceData {
    type Patch = ScheduleWorkspacePatch;
    type Edit = ScheduleEdit;
    type Request = ScheduleSetRequest;

    const KIND: &'static str = "schedules";
    const DRAFT_KEY: &'static str = "scheduleDraft";

    fn to_yaml(&self) -> Result<String, yaml::Error> {
        yaml::schedule::serialize(self)
    }

    fn parse_yaml(text: &str) -> Result<Self::Patch, yaml::Error> {
        yaml::schedule::parse(text)
    }

    fn merge(&mut self, patch: Self::Patch) {
        patch.merge_into(self);
    }

    fn apply(&mut self, edit: ScheduleEdit) -> Result<(), Error> {
        match edit {
            ScheduleEdit::SelectRoute(id) => self.selected_route_id = id,
            ScheduleEdit::AddSchedule => {
                let route = self.selected_route().ok_or(Error::NoRouteSelected)?;
                let schedule = Schedule::for_route(route);
                self.schedules.push(schedule);
            }
            ScheduleEdit::RemoveSchedule(index) => {
                schedule_mut(self, index)?;
                self.schedules.remove(index);
            }
            ScheduleEdit::Name { schedule, value } => schedule_mut(self, schedule)?.name = value,
            ScheduleEdit::Type {
                schedule,
                schedule_type,
            } => schedule_mut(self, schedule)?.schedule_type = schedule_type,
            ScheduleEdit::Status { schedule, status } => {
                schedule_mut(self, schedule)?.status = status
            }
            ScheduleEdit::Dates {
                schedule,
                start,
                end,
            } => {
                let schedule = schedule_mut(self, schedule)?;
                schedule.effective_start_date = start;
                schedule.effective_end_date = end;
            }
            ScheduleEdit::Description { schedule, value } => {
                schedule_mut(self, schedule)?.description = value
            }
            ScheduleEdit::GenerateTrips { schedule, enabled } => {
                schedule_mut(self, schedule)?.generate_trips = enabled
            }
            ScheduleEdit::Day {
                schedule,
                day,
                active,
            } => schedule_mut(self, schedule)?.calendar.set(day, active),
            ScheduleEdit::AddException {
                schedule,
                exception,
            } => schedule_mut(self, schedule)?.exceptions.push(exception),
            ScheduleEdit::RemoveException {
                schedule,
                exception,
            } => {
                let schedule = schedule_mut(self, schedule)?;
                if exception >= schedule.exceptions.len() {
                    return Err(Error::OutOfRange {
                        what: "exception",
                        index: exception,
                    });
                }
                schedule.exceptions.remove(exception);
            }
            ScheduleEdit::StopTimes {
                schedule,
                stop,
                arrival,
                departure,
            } => {
                let stop_index = stop;
                let stop = schedule_mut(self, schedule)?
                    .stops
                    .get_mut(stop_index)
                    .ok_or(Error::OutOfRange {
                        what: "stop",
                        index: stop_index,
                    })?;
                stop.arrival_time = arrival;
                stop.departure_time = departure;
            }
        }
        Ok(())
    }

    async fn validate<L: StopLookup + Sync>(&self, _lookup: &L) -> ValidationReport {
        validate_schedules(self)
    }

    fn to_request(&self) -> ScheduleSetRequest {
        ScheduleSetRequest {
            route_id: self.selected_route_id.clone(),
            schedules: self.schedules.iter().map(ScheduleRequest::from).collect(),
        }
    }

    /// The available routes survive a reset; they are not part of what is authored.
    fn blank(&self) -> Self {
        Self {
            available_routes: self.available_routes.clone(),
            ..Default::default()
        }
    }
}
