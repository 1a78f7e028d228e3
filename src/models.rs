use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ===== Entity Rows =====

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub district: String,
    pub office: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: i32,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub name: Option<String>,
    pub money_raised: f64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i32,
    pub name: String,
    pub contact_info: String,
    pub is_interested_in_volunteering: bool,
    pub donation_amount: f64,
    pub interested_volunteer_role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i32,
    pub candidate_id: i32,
    pub created_at: Option<DateTime<Utc>>,
}

// ===== Extended Structs for API Responses =====

/// Volunteer together with the roles and candidates linked through the
/// association tables.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerDetail {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub roles: Vec<Role>,
    pub candidates: Vec<Candidate>,
}

/// Event together with its linked volunteer and attendance ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventWithLinks {
    pub id: i32,
    pub name: Option<String>,
    pub money_raised: f64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: Option<DateTime<Utc>>,
    pub volunteer_ids: Vec<i32>,
    pub attendance_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignWithEvents {
    pub id: i32,
    pub candidate_id: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub event_ids: Vec<i32>,
}

// ===== Report Rows (aggregates grouped by campaign) =====

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMoneyRaised {
    pub campaign_id: i32,
    pub candidate_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub total_money_raised: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDonations {
    pub campaign_id: i32,
    pub candidate_id: i32,
    pub total_donations: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAttendees {
    pub campaign_id: i32,
    pub candidate_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub total_attendees: i64,
}

// ===== Request Payloads =====
//
// Every field is optional so the same payload type serves both creation
// (where the handler checks presence and returns the missing field names)
// and partial update (where absent fields keep their stored values).

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub district: Option<String>,
    pub office: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub first_name: String,
    pub last_name: String,
    pub district: String,
    pub office: String,
}

impl CandidatePayload {
    pub fn validated(&self) -> Result<NewCandidate, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.first_name.is_none() {
            missing.push("firstName");
        }
        if self.last_name.is_none() {
            missing.push("lastName");
        }
        if self.district.is_none() {
            missing.push("district");
        }
        if self.office.is_none() {
            missing.push("office");
        }
        match (&self.first_name, &self.last_name, &self.district, &self.office) {
            (Some(first_name), Some(last_name), Some(district), Some(office)) => {
                Ok(NewCandidate {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    district: district.clone(),
                    office: office.clone(),
                })
            }
            _ => Err(missing),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerPayload {
    pub name: Option<String>,
    /// Candidate to link the volunteer to, if any.
    pub candidate_id: Option<i32>,
    /// Role to link the volunteer to, if any.
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewVolunteer {
    pub name: String,
}

impl VolunteerPayload {
    pub fn validated(&self) -> Result<NewVolunteer, Vec<&'static str>> {
        match &self.name {
            Some(name) => Ok(NewVolunteer { name: name.clone() }),
            None => Err(vec!["name"]),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
}

impl RolePayload {
    pub fn validated(&self) -> Result<NewRole, Vec<&'static str>> {
        match &self.name {
            Some(name) => Ok(NewRole {
                name: name.clone(),
                description: self.description.clone(),
            }),
            None => Err(vec!["name"]),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub name: Option<String>,
    pub money_raised: Option<f64>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Volunteer ids to record as event staff; unknown ids are skipped.
    pub staff: Option<Vec<i32>>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: Option<String>,
    pub money_raised: f64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl EventPayload {
    pub fn validated(&self) -> Result<NewEvent, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.money_raised.is_none() {
            missing.push("moneyRaised");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.start_time.is_none() {
            missing.push("startTime");
        }
        if self.end_time.is_none() {
            missing.push("endTime");
        }
        match (self.money_raised, self.date, self.start_time, self.end_time) {
            (Some(money_raised), Some(date), Some(start_time), Some(end_time)) => Ok(NewEvent {
                name: self.name.clone(),
                money_raised,
                date,
                start_time,
                end_time,
            }),
            _ => Err(missing),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    pub name: Option<String>,
    pub contact_info: Option<String>,
    pub is_interested_in_volunteering: Option<bool>,
    pub donation_amount: Option<f64>,
    pub interested_volunteer_role: Option<String>,
    /// Event to link the attendance to, if any.
    pub event_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub name: String,
    pub contact_info: String,
    pub is_interested_in_volunteering: bool,
    pub donation_amount: f64,
    pub interested_volunteer_role: Option<String>,
}

impl AttendancePayload {
    pub fn validated(&self) -> Result<NewAttendance, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.contact_info.is_none() {
            missing.push("contactInfo");
        }
        if self.is_interested_in_volunteering.is_none() {
            missing.push("isInterestedInVolunteering");
        }
        if self.donation_amount.is_none() {
            missing.push("donationAmount");
        }
        match (
            &self.name,
            &self.contact_info,
            self.is_interested_in_volunteering,
            self.donation_amount,
        ) {
            (Some(name), Some(contact_info), Some(interested), Some(donation_amount)) => {
                Ok(NewAttendance {
                    name: name.clone(),
                    contact_info: contact_info.clone(),
                    is_interested_in_volunteering: interested,
                    donation_amount,
                    interested_volunteer_role: self.interested_volunteer_role.clone(),
                })
            }
            _ => Err(missing),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPayload {
    pub candidate_id: Option<i32>,
    /// Event ids the campaign aggregates over; unknown ids are skipped.
    pub event_ids: Option<Vec<i32>>,
}

impl CampaignPayload {
    pub fn validated(&self) -> Result<i32, Vec<&'static str>> {
        match self.candidate_id {
            Some(candidate_id) => Ok(candidate_id),
            None => Err(vec!["candidateId"]),
        }
    }
}

// ===== Shared Response Wrappers =====

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}
