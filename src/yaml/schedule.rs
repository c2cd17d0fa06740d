use serde::{Deserialize, Serialize};

use super::{check_version, decode, lenient, merge_keyed_list, merge_list, set};
use crate::model::{
    Calendar, ExceptionType, Schedule, ScheduleException, ScheduleStatus, ScheduleStop,
    ScheduleType, ScheduleWorkspaceData,
};

#[derive(Serialize)]
struct Document<'a> {
    version: u32,
    selected_route_id: &'a str,
    schedules: Vec<ScheduleView<'a>>,
}

#[derive(Serialize)]
struct ScheduleView<'a> {
    id: &'a str,
    name: &'a str,
    route_id: &'a str,
    schedule_type: ScheduleType,
    status: ScheduleStatus,
    effective_start_date: &'a str,
    effective_end_date: &'a str,
    description: &'a str,
    generate_trips: bool,
    calendar: &'a Calendar,
    exceptions: Vec<ExceptionView<'a>>,
    stops: Vec<StopView<'a>>,
}

#[derive(Serialize)]
struct ExceptionView<'a> {
    date: &'a str,
    #[serde(rename = "type")]
    exception_type: ExceptionType,
}

#[derive(Serialize)]
struct StopView<'a> {
    stop_id: &'a str,
    stop_name: &'a str,
    stop_order: u32,
    arrival_time: &'a str,
    departure_time: &'a str,
}

impl<'a> From<&'a Schedule> for ScheduleView<'a> {
    fn from(schedule: &'a Schedule) -> Self {
        Self {
            id: schedule.id.as_deref().unwrap_or_default(),
            name: &schedule.name,
            route_id: &schedule.route_id,
            schedule_type: schedule.schedule_type,
            status: schedule.status,
            effective_start_date: &schedule.effective_start_date,
            effective_end_date: &schedule.effective_end_date,
            description: &schedule.description,
            generate_trips: schedule.generate_trips,
            calendar: &schedule.calendar,
            exceptions: schedule
                .exceptions
                .iter()
                .map(|exception| ExceptionView {
                    date: &exception.date,
                    exception_type: exception.exception_type,
                })
                .collect(),
            stops: schedule
                .stops
                .iter()
                .map(|stop| StopView {
                    stop_id: &stop.stop_id,
                    stop_name: &stop.stop_name,
                    stop_order: stop.stop_order,
                    arrival_time: &stop.arrival_time,
                    departure_time: &stop.departure_time,
                })
                .collect(),
        }
    }
}

/// Renders the schedules being authored as YAML. Available routes are
/// reference data and are not part of the text.
pub fn serialize(data: &ScheduleWorkspaceData) -> Result<String, super::Error> {
    let document = Document {
        version: super::VERSION,
        selected_route_id: data.selected_route_id.as_deref().unwrap_or_default(),
        schedules: data.schedules.iter().map(ScheduleView::from).collect(),
    };
    Ok(serde_yaml::to_string(&document)?)
}

pub fn parse(text: &str) -> Result<ScheduleWorkspacePatch, super::Error> {
    let patch: ScheduleWorkspacePatch = decode(text)?;
    check_version(patch.version)?;
    Ok(patch)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleWorkspacePatch {
    #[serde(deserialize_with = "lenient::scalar")]
    pub version: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_scalar")]
    pub selected_route_id: Option<Option<String>>,
    pub schedules: Option<Vec<SchedulePatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchedulePatch {
    #[serde(deserialize_with = "lenient::optional_scalar")]
    pub id: Option<Option<String>>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub route_id: Option<String>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub status: Option<ScheduleStatus>,
    #[serde(deserialize_with = "lenient::text")]
    pub effective_start_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub effective_end_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub generate_trips: Option<bool>,
    pub calendar: Option<CalendarPatch>,
    pub exceptions: Option<Vec<ExceptionPatch>>,
    pub stops: Option<Vec<ScheduleStopPatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalendarPatch {
    #[serde(deserialize_with = "lenient::scalar")]
    pub monday: Option<bool>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub tuesday: Option<bool>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub wednesday: Option<bool>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub thursday: Option<bool>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub friday: Option<bool>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub saturday: Option<bool>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub sunday: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExceptionPatch {
    #[serde(deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::scalar")]
    pub exception_type: Option<ExceptionType>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleStopPatch {
    #[serde(deserialize_with = "lenient::text")]
    pub stop_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub stop_name: Option<String>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub stop_order: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub arrival_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub departure_time: Option<String>,
}

impl ScheduleWorkspacePatch {
    pub fn is_empty(&self) -> bool {
        self.selected_route_id.is_none() && self.schedules.is_none()
    }

    pub fn merge_into(self, data: &mut ScheduleWorkspaceData) {
        set(&mut data.selected_route_id, self.selected_route_id);
        if let Some(schedules) = self.schedules {
            merge_keyed_list(
                schedules,
                &mut data.schedules,
                SchedulePatch::id,
                schedule_id,
                SchedulePatch::merge_into,
            );
        }
    }
}

fn schedule_id(schedule: &Schedule) -> Option<&str> {
    schedule.id.as_deref()
}

impl SchedulePatch {
    fn id(&self) -> Option<Option<&str>> {
        self.id.as_ref().map(Option::as_deref)
    }

    pub fn merge_into(self, schedule: &mut Schedule) {
        set(&mut schedule.id, self.id);
        set(&mut schedule.name, self.name);
        set(&mut schedule.route_id, self.route_id);
        set(&mut schedule.schedule_type, self.schedule_type);
        set(&mut schedule.status, self.status);
        set(&mut schedule.effective_start_date, self.effective_start_date);
        set(&mut schedule.effective_end_date, self.effective_end_date);
        set(&mut schedule.description, self.description);
        set(&mut schedule.generate_trips, self.generate_trips);
        if let Some(calendar) = self.calendar {
            calendar.merge_into(&mut schedule.calendar);
        }
        if let Some(exceptions) = self.exceptions {
            merge_list(exceptions, &mut schedule.exceptions, ExceptionPatch::merge_into);
        }
        if let Some(stops) = self.stops {
            merge_list(stops, &mut schedule.stops, ScheduleStopPatch::merge_into);
        }
    }
}

impl CalendarPatch {
    pub fn merge_into(self, calendar: &mut Calendar) {
        set(&mut calendar.monday, self.monday);
        set(&mut calendar.tuesday, self.tuesday);
        set(&mut calendar.wednesday, self.wednesday);
        set(&mut calendar.thursday, self.thursday);
        set(&mut calendar.friday, self.friday);
        set(&mut calendar.saturday, self.saturday);
        set(&mut calendar.sunday, self.sunday);
    }
}

impl ExceptionPatch {
    pub fn merge_into(self, exception: &mut ScheduleException) {
        set(&mut exception.date, self.date);
        set(&mut exception.exception_type, self.exception_type);
    }
}

impl ScheduleStopPatch {
    pub fn merge_into(self, stop: &mut ScheduleStop) {
        set(&mut stop.stop_id, self.stop_id);
        set(&mut stop.stop_name, self.stop_name);
        set(&mut stop.stop_order, self.stop_order);
        set(&mut stop.arrival_time, self.arrival_time);
        set(&mut stop.departure_time, self.departure_time);
    }
}
