use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{Direction, StopRef};

text_enum!(
    ScheduleType, "schedule type" {
        Regular => "REGULAR",
        Special => "SPECIAL",
    }
);

text_enum!(
    ScheduleStatus, "schedule status" {
        Pending => "PENDING",
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Cancelled => "CANCELLED",
    }
);

text_enum!(
    /// `Added` marks a one-off operating date, `Removed` a date the schedule does not run.
    ExceptionType, "exception type" {
        Removed => "REMOVED",
        Added => "ADDED",
    }
);

/// Days of the week a schedule operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Calendar {
    pub const WEEKDAYS: Calendar = Calendar {
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        saturday: false,
        sunday: false,
    };

    pub fn get(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn set(&mut self, day: Weekday, active: bool) {
        let slot = match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = active;
    }

    pub fn has_active_day(&self) -> bool {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
        .contains(&true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    /// `YYYY-MM-DD`
    pub date: String,
    pub exception_type: ExceptionType,
}

/// Timing at one stop of a schedule. Times are kept as typed (`HH:MM`)
/// so malformed input survives until validation reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_order: u32,
    pub arrival_time: String,
    pub departure_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Option<String>,
    pub name: String,
    pub route_id: String,
    pub schedule_type: ScheduleType,
    pub status: ScheduleStatus,
    pub effective_start_date: String,
    /// Empty for open ended schedules.
    pub effective_end_date: String,
    pub description: String,
    pub generate_trips: bool,
    pub calendar: Calendar,
    pub exceptions: Vec<ScheduleException>,
    pub stops: Vec<ScheduleStop>,
}

impl Schedule {
    /// A blank weekday schedule with one untimed stop per route stop.
    pub fn for_route(route: &RouteSummary) -> Self {
        let stops = route
            .stops
            .iter()
            .enumerate()
            .map(|(i, stop)| ScheduleStop {
                stop_id: stop.id.clone(),
                stop_name: stop.name.clone(),
                stop_order: i as u32,
                ..Default::default()
            })
            .collect();
        Self {
            route_id: route.id.clone(),
            calendar: Calendar::WEEKDAYS,
            stops,
            ..Default::default()
        }
    }

    pub fn has_operating_date(&self) -> bool {
        self.calendar.has_active_day()
            || self
                .exceptions
                .iter()
                .any(|exception| exception.exception_type == ExceptionType::Added)
    }
}

/// Read-only view of a route a schedule can be attached to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub id: String,
    pub name: String,
    pub route_number: String,
    pub direction: Direction,
    /// Stops in travel order.
    pub stops: Vec<StopRef>,
}

/// Document edited by the schedule workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWorkspaceData {
    pub available_routes: Vec<RouteSummary>,
    pub selected_route_id: Option<String>,
    pub schedules: Vec<Schedule>,
}

impl ScheduleWorkspaceData {
    pub fn route(&self, id: &str) -> Option<&RouteSummary> {
        self.available_routes.iter().find(|route| route.id == id)
    }

    pub fn selected_route(&self) -> Option<&RouteSummary> {
        self.selected_route_id
            .as_deref()
            .and_then(|id| self.route(id))
    }
}
