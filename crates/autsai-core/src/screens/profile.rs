use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use autsai_db::{Gateway, GatewayError, ListQuery};
use autsai_types::Collection;
use autsai_types::codec::{embedded, timestamp};
use autsai_types::models::{FacilityProfile, OpeningHours, PartnerProfile, PayoutInfo};

use super::{DataSource, or_sample};
use crate::ScreenError;
use crate::draft::Draft;
use crate::sample;

// -- Catalogs --

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SportOption {
    pub value: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const SPORTS_OPTIONS: &[SportOption] = &[
    SportOption { value: "padel", label: "Padel", icon: "🏓" },
    SportOption { value: "tennis", label: "Tennis", icon: "🎾" },
    SportOption { value: "squash", label: "Squash", icon: "🏸" },
    SportOption { value: "golf", label: "Golf", icon: "⛳" },
    SportOption { value: "basketball", label: "Basketball", icon: "🏀" },
    SportOption { value: "football", label: "Football", icon: "⚽" },
    SportOption { value: "fitness", label: "Fitness", icon: "💪" },
    SportOption { value: "swimming", label: "Swimming", icon: "🏊" },
];

pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

// -- Sections --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSection {
    #[default]
    Account,
    Facility,
    Payout,
    Settings,
    Legal,
}

impl ProfileSection {
    pub const ALL: [ProfileSection; 5] = [
        Self::Account,
        Self::Facility,
        Self::Payout,
        Self::Settings,
        Self::Legal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Facility => "facility",
            Self::Payout => "payout",
            Self::Settings => "settings",
            Self::Legal => "legal",
        }
    }
}

impl FromStr for ProfileSection {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| ScreenError::Invalid(format!("profile section '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoursField {
    Open,
    Close,
}

// -- Helpers --

/// Search link for an address; empty when there is no address.
pub fn google_maps_link(address: &str) -> String {
    if address.trim().is_empty() {
        return String::new();
    }
    let query: String = url::form_urlencoded::byte_serialize(address.as_bytes()).collect();
    format!("https://maps.google.com/?q={}", query)
}

/// Show only the last four characters of an account number.
pub fn mask_account_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}

pub fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "Enabled" } else { "Disabled" }
}

// -- Controller --

/// Open edit buffer. Account, settings and legal all edit the partner
/// profile.
#[derive(Debug, Clone)]
enum Editing {
    Partner(Draft<PartnerProfile>),
    Facility(Draft<FacilityProfile>),
    Payout(Draft<PayoutInfo>),
}

impl Editing {
    fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<(), serde_json::Error> {
        match self {
            Self::Partner(d) => d.apply_patch(patch),
            Self::Facility(d) => d.apply_patch(patch),
            Self::Payout(d) => d.apply_patch(patch),
        }
    }

    fn changes(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match self {
            Self::Partner(d) => d.changes(),
            Self::Facility(d) => d.changes(),
            Self::Payout(d) => d.changes(),
        }
    }

    fn working(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Partner(d) => serde_json::to_value(d.get()),
            Self::Facility(d) => serde_json::to_value(d.get()),
            Self::Payout(d) => serde_json::to_value(d.get()),
        }
    }

    fn target(&self) -> (Collection, String) {
        match self {
            Self::Partner(d) => (Collection::PartnerProfiles, d.original().id.clone()),
            Self::Facility(d) => (Collection::FacilityProfiles, d.original().id.clone()),
            Self::Payout(d) => (Collection::PayoutInformation, d.original().id.clone()),
        }
    }
}

pub struct Profile<G> {
    gateway: Arc<G>,
    loading: bool,
    source: DataSource,
    section: ProfileSection,
    partner: Option<PartnerProfile>,
    facility: Option<FacilityProfile>,
    payout: Option<PayoutInfo>,
    editing: Option<Editing>,
    reveal_bank: bool,
}

#[derive(Debug, Serialize)]
pub struct FacilityProfileView {
    #[serde(flatten)]
    pub profile: FacilityProfile,
    pub maps_link: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub loading: bool,
    pub source: DataSource,
    pub section: ProfileSection,
    pub editing: bool,
    /// Working copy of the open draft.
    pub form: Option<Value>,
    pub partner: Option<PartnerProfile>,
    pub booking_auto_accept: Option<&'static str>,
    pub facility: Option<FacilityProfileView>,
    /// Account number is masked unless revealed.
    pub payout: Option<PayoutInfo>,
    pub bank_details_revealed: bool,
    pub sports_options: &'static [SportOption],
    pub weekdays: [&'static str; 7],
}

struct Loaded {
    partner: PartnerProfile,
    facility: FacilityProfile,
    payout: PayoutInfo,
}

impl<G: Gateway> Profile<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            loading: true,
            source: DataSource::Empty,
            section: ProfileSection::default(),
            partner: None,
            facility: None,
            payout: None,
            editing: None,
            reveal_bank: false,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let (loaded, source) = or_sample(self.fetch().await, "profile", || Loaded {
            partner: sample::partner_profile(),
            facility: sample::facility_profile(),
            payout: sample::payout_info(),
        });

        self.partner = Some(loaded.partner);
        self.facility = Some(loaded.facility);
        self.payout = Some(loaded.payout);
        self.source = source;
        self.loading = false;
    }

    /// One record per collection; a missing record is replaced by its sample.
    async fn fetch(&self) -> Result<Loaded, GatewayError> {
        let user = self.gateway.me().await?;
        let owned = || ListQuery::new().filter("user_id", user.id.clone()).limit(1);

        let (partner, facility, payout) = tokio::join!(
            self.gateway.list_as::<PartnerProfile>(Collection::PartnerProfiles, owned()),
            self.gateway.list_as::<FacilityProfile>(Collection::FacilityProfiles, owned()),
            self.gateway.list_as::<PayoutInfo>(Collection::PayoutInformation, owned()),
        );

        Ok(Loaded {
            partner: partner?.into_iter().next().unwrap_or_else(sample::partner_profile),
            facility: facility?.into_iter().next().unwrap_or_else(sample::facility_profile),
            payout: payout?.into_iter().next().unwrap_or_else(sample::payout_info),
        })
    }

    pub fn section(&self) -> ProfileSection {
        self.section
    }

    pub fn partner(&self) -> Option<&PartnerProfile> {
        self.partner.as_ref()
    }

    pub fn facility(&self) -> Option<&FacilityProfile> {
        self.facility.as_ref()
    }

    pub fn payout(&self) -> Option<&PayoutInfo> {
        self.payout.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Switch section. An open draft is discarded.
    pub fn set_section(&mut self, section: ProfileSection) {
        self.section = section;
        self.editing = None;
    }

    pub fn reveal_bank_details(&mut self, reveal: bool) {
        self.reveal_bank = reveal;
    }

    // -- Draft lifecycle --

    /// Snapshot the record behind the active section into a fresh draft.
    pub fn begin_edit(&mut self) -> Result<(), ScreenError> {
        let editing = match self.section {
            ProfileSection::Account | ProfileSection::Settings | ProfileSection::Legal => {
                self.partner.as_ref().map(|p| Editing::Partner(Draft::begin(p)))
            }
            ProfileSection::Facility => self.facility.as_ref().map(|f| Editing::Facility(Draft::begin(f))),
            ProfileSection::Payout => self.payout.as_ref().map(|p| Editing::Payout(Draft::begin(p))),
        };
        self.editing = Some(editing.ok_or(ScreenError::NotEditing("profile not loaded"))?);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Write form fields into the draft.
    pub fn edit_patch(&mut self, patch: &Map<String, Value>) -> Result<(), ScreenError> {
        let editing = self
            .editing
            .as_mut()
            .ok_or(ScreenError::NotEditing("no open draft"))?;
        editing
            .apply_patch(patch)
            .map_err(|e| ScreenError::Invalid(e.to_string()))
    }

    pub fn toggle_sport(&mut self, sport: &str, checked: bool) -> Result<(), ScreenError> {
        let sports = &mut self.facility_draft()?.sports_offered;
        if checked {
            if !sports.iter().any(|s| s == sport) {
                sports.push(sport.to_string());
            }
        } else {
            sports.retain(|s| s != sport);
        }
        Ok(())
    }

    pub fn set_hours(&mut self, day: &str, field: HoursField, value: &str) -> Result<(), ScreenError> {
        if !WEEKDAYS.contains(&day) {
            return Err(ScreenError::Invalid(format!("weekday '{}'", day)));
        }
        let hours = self
            .facility_draft()?
            .operating_hours
            .entry(day.to_string())
            .or_insert_with(|| OpeningHours {
                open: String::new(),
                close: String::new(),
            });
        match field {
            HoursField::Open => hours.open = value.to_string(),
            HoursField::Close => hours.close = value.to_string(),
        }
        Ok(())
    }

    /// Accepting stamps the time; withdrawing clears it.
    pub fn accept_terms(&mut self, accepted: bool, now: NaiveDateTime) -> Result<(), ScreenError> {
        let Some(Editing::Partner(draft)) = self.editing.as_mut() else {
            return Err(ScreenError::NotEditing("partner profile"));
        };
        let partner = draft.get_mut();
        partner.terms_accepted = accepted;
        partner.terms_accepted_at = accepted.then(|| timestamp::format(&now));
        Ok(())
    }

    fn facility_draft(&mut self) -> Result<&mut FacilityProfile, ScreenError> {
        match self.editing.as_mut() {
            Some(Editing::Facility(draft)) => Ok(draft.get_mut()),
            _ => Err(ScreenError::NotEditing("facility profile")),
        }
    }

    /// Send the changed fields and commit the draft. A failed write keeps the
    /// draft open.
    pub async fn save(&mut self) -> Result<(), ScreenError> {
        let editing = self
            .editing
            .as_ref()
            .ok_or(ScreenError::NotEditing("no open draft"))?;
        let mut patch = editing.changes().map_err(GatewayError::from)?;

        if !patch.is_empty() {
            if let Editing::Facility(draft) = editing {
                let working = draft.get();
                if let Some(value) = patch.get_mut("sports_offered") {
                    *value = Value::String(embedded::to_text(&working.sports_offered));
                }
                if let Some(value) = patch.get_mut("operating_hours") {
                    *value = Value::String(embedded::to_text(&working.operating_hours));
                }
            }

            let (collection, id) = editing.target();
            if let Err(e) = self.gateway.update(collection, &id, Value::Object(patch)).await {
                warn!("Failed to save {} {}: {}", collection, id, e);
                return Err(e.into());
            }
            info!("Saved {} {}", collection, id);
        }

        match self.editing.take() {
            Some(Editing::Partner(d)) => self.partner = Some(d.into_working()),
            Some(Editing::Facility(d)) => self.facility = Some(d.into_working()),
            Some(Editing::Payout(d)) => self.payout = Some(d.into_working()),
            None => {}
        }
        Ok(())
    }

    pub async fn request_account_deletion(&mut self, now: NaiveDateTime) -> Result<(), ScreenError> {
        let id = self
            .partner
            .as_ref()
            .map(|p| p.id.clone())
            .ok_or(ScreenError::NotEditing("profile not loaded"))?;
        let at = timestamp::format(&now);

        let patch = json!({
            "account_deletion_requested": 1,
            "account_deletion_requested_at": at,
        });
        if let Err(e) = self.gateway.update(Collection::PartnerProfiles, &id, patch).await {
            warn!("Failed to request account deletion: {}", e);
            return Err(e.into());
        }

        if let Some(partner) = self.partner.as_mut() {
            partner.account_deletion_requested = true;
            partner.account_deletion_requested_at = Some(at);
        }
        info!("Account deletion requested for profile {}", id);
        Ok(())
    }

    pub fn view(&self) -> ProfileView {
        let payout = self.payout.clone().map(|mut p| {
            if !self.reveal_bank {
                p.bank_account_number = mask_account_number(&p.bank_account_number);
            }
            p
        });
        let facility = self.facility.clone().map(|profile| {
            let maps_link = match profile.google_maps_link.as_deref() {
                Some(link) if !link.is_empty() => link.to_string(),
                _ => google_maps_link(&profile.address),
            };
            FacilityProfileView { profile, maps_link }
        });

        ProfileView {
            loading: self.loading,
            source: self.source,
            section: self.section,
            editing: self.editing.is_some(),
            form: self.editing.as_ref().and_then(|e| e.working().ok()),
            partner: self.partner.clone(),
            booking_auto_accept: self.partner.as_ref().map(|p| enabled_label(p.booking_auto_accept)),
            facility,
            payout,
            bank_details_revealed: self.reveal_bank,
            sports_options: SPORTS_OPTIONS,
            weekdays: WEEKDAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryGateway;

    fn now() -> NaiveDateTime {
        timestamp::parse("2025-02-01T09:15:00").unwrap()
    }

    fn seeded() -> MemoryGateway {
        MemoryGateway::new()
            .seed(
                Collection::PartnerProfiles,
                vec![json!({"id": "pp1", "user_id": "user_1", "full_name": "Ana Lopez",
                            "booking_auto_accept": "0", "terms_accepted": 0})],
            )
            .seed(
                Collection::FacilityProfiles,
                vec![json!({"id": "fp1", "user_id": "user_1", "facility_name": "Club Norte",
                            "address": "Calle Mayor 1, Madrid", "sports_offered": "[\"padel\"]",
                            "operating_hours": "{}"})],
            )
    }

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn missing_records_fall_back_individually() {
        let mut profile = Profile::new(Arc::new(seeded()));
        profile.load().await;

        assert_eq!(profile.source, DataSource::Remote);
        assert_eq!(profile.partner().unwrap().id, "pp1");
        assert_eq!(profile.facility().unwrap().sports_offered, vec!["padel"]);
        assert_eq!(profile.payout().unwrap().id, "payout_1");
    }

    #[tokio::test]
    async fn offline_uses_all_samples() {
        let mut profile = Profile::new(Arc::new(MemoryGateway::offline()));
        profile.load().await;

        let view = profile.view();
        assert_eq!(view.source, DataSource::Sample);
        assert_eq!(view.partner.unwrap().full_name, "Carlos Rodriguez");
        assert_eq!(view.facility.unwrap().profile.operating_hours.len(), 7);
    }

    #[tokio::test]
    async fn saving_partner_sends_only_changes() {
        let gateway = Arc::new(seeded());
        let mut profile = Profile::new(gateway.clone());
        profile.load().await;

        profile.begin_edit().unwrap();
        profile.edit_patch(&patch(json!({"full_name": "Ana López", "id": "hijack"}))).unwrap();
        profile.save().await.unwrap();

        let (collection, id, sent) = gateway.writes().pop().unwrap();
        assert_eq!(collection, Collection::PartnerProfiles);
        assert_eq!(id, "pp1");
        assert_eq!(sent, json!({"full_name": "Ana López"}));
        assert_eq!(profile.partner().unwrap().full_name, "Ana López");
        assert!(!profile.is_editing());
    }

    #[tokio::test]
    async fn settings_toggle_updates_label() {
        let gateway = Arc::new(seeded());
        let mut profile = Profile::new(gateway.clone());
        profile.load().await;
        assert_eq!(profile.view().booking_auto_accept, Some("Disabled"));

        profile.set_section(ProfileSection::Settings);
        profile.begin_edit().unwrap();
        profile.edit_patch(&patch(json!({"booking_auto_accept": true}))).unwrap();
        profile.save().await.unwrap();

        assert_eq!(profile.view().booking_auto_accept, Some("Enabled"));
        assert_eq!(gateway.writes().pop().unwrap().2, json!({"booking_auto_accept": 1}));
        assert_eq!(profile.partner().unwrap().full_name, "Ana Lopez");
    }

    #[tokio::test]
    async fn facility_save_writes_embedded_text() {
        let gateway = Arc::new(seeded());
        let mut profile = Profile::new(gateway.clone());
        profile.load().await;

        profile.set_section(ProfileSection::Facility);
        profile.begin_edit().unwrap();
        profile.toggle_sport("tennis", true).unwrap();
        profile.toggle_sport("tennis", true).unwrap();
        profile.toggle_sport("padel", false).unwrap();
        profile.set_hours("monday", HoursField::Open, "08:00").unwrap();
        assert!(profile.set_hours("someday", HoursField::Open, "08:00").is_err());
        profile.save().await.unwrap();

        let (_, id, sent) = gateway.writes().pop().unwrap();
        assert_eq!(id, "fp1");
        assert_eq!(
            sent,
            json!({
                "sports_offered": "[\"tennis\"]",
                "operating_hours": "{\"monday\":{\"open\":\"08:00\",\"close\":\"\"}}",
            })
        );

        // the stored text decodes back on the next load
        profile.load().await;
        assert_eq!(profile.facility().unwrap().sports_offered, vec!["tennis"]);
        assert_eq!(profile.facility().unwrap().operating_hours["monday"].open, "08:00");
    }

    #[tokio::test]
    async fn failed_save_keeps_draft() {
        let gateway = Arc::new(seeded());
        let mut profile = Profile::new(gateway.clone());
        profile.load().await;

        profile.begin_edit().unwrap();
        profile.accept_terms(true, now()).unwrap();
        gateway.fail_writes(true);
        assert!(profile.save().await.is_err());

        assert!(profile.is_editing());
        assert!(!profile.partner().unwrap().terms_accepted);
        let form = profile.view().form.unwrap();
        assert_eq!(form["terms_accepted_at"], "2025-02-01T09:15:00");
    }

    #[tokio::test]
    async fn withdrawing_terms_clears_timestamp() {
        let mut profile = Profile::new(Arc::new(MemoryGateway::offline()));
        profile.load().await;
        profile.set_section(ProfileSection::Legal);
        profile.begin_edit().unwrap();
        profile.accept_terms(false, now()).unwrap();

        let form = profile.view().form.unwrap();
        assert_eq!(form["terms_accepted"], 0);
        assert!(form["terms_accepted_at"].is_null());

        profile.cancel_edit();
        assert!(profile.partner().unwrap().terms_accepted);
    }

    #[tokio::test]
    async fn switching_section_discards_draft() {
        let mut profile = Profile::new(Arc::new(seeded()));
        profile.load().await;

        profile.begin_edit().unwrap();
        profile.set_section(ProfileSection::Payout);
        assert!(!profile.is_editing());
        assert!(matches!(profile.toggle_sport("golf", true), Err(ScreenError::NotEditing(_))));
        assert!(profile.save().await.is_err());
    }

    #[tokio::test]
    async fn deletion_request_is_stamped() {
        let gateway = Arc::new(seeded());
        let mut profile = Profile::new(gateway.clone());
        profile.load().await;

        profile.request_account_deletion(now()).await.unwrap();
        let partner = profile.partner().unwrap();
        assert!(partner.account_deletion_requested);
        assert_eq!(partner.account_deletion_requested_at.as_deref(), Some("2025-02-01T09:15:00"));
        assert_eq!(
            gateway.records(Collection::PartnerProfiles)[0]["account_deletion_requested"],
            1
        );
    }

    #[tokio::test]
    async fn payout_is_masked_until_revealed() {
        let gateway = MemoryGateway::new().seed(
            Collection::PayoutInformation,
            vec![json!({"id": "po1", "user_id": "user_1", "account_holder_name": "Ana Lopez",
                        "bank_account_number": "ES9121000418450200051332"})],
        );
        let mut profile = Profile::new(Arc::new(gateway));
        profile.load().await;

        assert_eq!(profile.view().payout.unwrap().bank_account_number, "****1332");
        profile.reveal_bank_details(true);
        assert_eq!(
            profile.view().payout.unwrap().bank_account_number,
            "ES9121000418450200051332"
        );
    }

    #[test]
    fn maps_link_encodes_address() {
        assert_eq!(
            google_maps_link("Calle del Deporte 123, Madrid"),
            "https://maps.google.com/?q=Calle+del+Deporte+123%2C+Madrid"
        );
        assert_eq!(google_maps_link("  "), "");
    }

    #[test]
    fn section_names_round_trip() {
        for section in ProfileSection::ALL {
            assert_eq!(section.as_str().parse::<ProfileSection>().unwrap(), section);
        }
        assert!("billing".parse::<ProfileSection>().is_err());
        assert_eq!(mask_account_number("12"), "****12");
    }
}
