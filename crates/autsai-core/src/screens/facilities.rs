use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use autsai_db::{Gateway, GatewayError, ListQuery, Order, UploadOptions};
use autsai_types::Collection;
use autsai_types::codec::timestamp;
use autsai_types::models::{Facility, FacilityAmenity, FacilityPhoto, FacilitySport};

use super::{DataSource, local_now, millis_id, or_sample};
use crate::ScreenError;
use crate::sample;

/// Prefix marking a record the partner created in the editor but that
/// hasn't been saved yet.
pub const NEW_PREFIX: &str = "new_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogOption {
    pub name: &'static str,
    pub icon: &'static str,
}

pub const SPORT_OPTIONS: [CatalogOption; 10] = [
    CatalogOption { name: "Padel", icon: "🏓" },
    CatalogOption { name: "Tennis", icon: "🎾" },
    CatalogOption { name: "Squash", icon: "🏸" },
    CatalogOption { name: "Golf", icon: "⛳" },
    CatalogOption { name: "Basketball", icon: "🏀" },
    CatalogOption { name: "Football", icon: "⚽" },
    CatalogOption { name: "Volleyball", icon: "🏐" },
    CatalogOption { name: "Swimming", icon: "🏊" },
    CatalogOption { name: "Fitness", icon: "💪" },
    CatalogOption { name: "Yoga", icon: "🧘" },
];

pub const AMENITY_OPTIONS: [CatalogOption; 12] = [
    CatalogOption { name: "Parking", icon: "🅿️" },
    CatalogOption { name: "Showers", icon: "🚿" },
    CatalogOption { name: "Lockers", icon: "🔒" },
    CatalogOption { name: "Cafeteria", icon: "☕" },
    CatalogOption { name: "Pro Shop", icon: "🛍️" },
    CatalogOption { name: "Fitness Center", icon: "💪" },
    CatalogOption { name: "Pool", icon: "🏊" },
    CatalogOption { name: "Sauna", icon: "🧖" },
    CatalogOption { name: "Lounge", icon: "🛋️" },
    CatalogOption { name: "WiFi", icon: "📶" },
    CatalogOption { name: "Air Conditioning", icon: "❄️" },
    CatalogOption { name: "Heating", icon: "🔥" },
];

pub struct FacilityEditor<G> {
    gateway: Arc<G>,
    loading: bool,
    source: DataSource,
    detail_source: DataSource,
    facilities: Vec<Facility>,
    selected: Option<String>,
    sports: Vec<FacilitySport>,
    amenities: Vec<FacilityAmenity>,
    photos: Vec<FacilityPhoto>,
}

#[derive(Debug, Serialize)]
pub struct SportView {
    #[serde(flatten)]
    pub sport: FacilitySport,
    pub equipment: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FacilityEditorView {
    pub loading: bool,
    pub source: DataSource,
    pub detail_source: DataSource,
    pub facilities: Vec<Facility>,
    pub selected: Option<Facility>,
    pub sports: Vec<SportView>,
    pub amenities: Vec<FacilityAmenity>,
    pub photos: Vec<FacilityPhoto>,
    pub sport_options: &'static [CatalogOption],
    pub amenity_options: &'static [CatalogOption],
}

type Details = (Vec<FacilitySport>, Vec<FacilityAmenity>, Vec<FacilityPhoto>);

impl<G: Gateway> FacilityEditor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            loading: true,
            source: DataSource::Empty,
            detail_source: DataSource::Empty,
            facilities: Vec::new(),
            selected: None,
            sports: Vec::new(),
            amenities: Vec::new(),
            photos: Vec::new(),
        }
    }

    /// Load the partner's facilities and the details of the selected one.
    /// A selection that no longer exists falls back to the first facility.
    pub async fn load(&mut self) {
        let (facilities, source) =
            or_sample(self.fetch_facilities().await, "facilities", || vec![sample::facility()]);

        let keep = self
            .selected
            .as_ref()
            .filter(|id| facilities.iter().any(|f| &f.id == *id))
            .cloned();
        self.selected = keep.or_else(|| facilities.first().map(|f| f.id.clone()));
        self.facilities = facilities;
        self.source = source;
        self.loading = false;

        self.load_details().await;
    }

    async fn fetch_facilities(&self) -> Result<Vec<Facility>, GatewayError> {
        let user = self.gateway.me().await?;
        self.gateway
            .list_as(
                Collection::Facilities,
                ListQuery::new()
                    .filter("user_id", user.id)
                    .order_by("created_at", Order::Desc),
            )
            .await
    }

    pub async fn select_facility(&mut self, id: &str) -> Result<(), ScreenError> {
        if !self.facilities.iter().any(|f| f.id == id) {
            return Err(ScreenError::NotFound(format!("facility {}", id)));
        }
        self.selected = Some(id.to_string());
        self.load_details().await;
        Ok(())
    }

    async fn load_details(&mut self) {
        let Some(facility_id) = self.selected.clone() else {
            self.sports.clear();
            self.amenities.clear();
            self.photos.clear();
            return;
        };

        let ((sports, amenities, photos), source) =
            or_sample(self.fetch_details(&facility_id).await, "facility details", || {
                (
                    sample::facility_sports(&facility_id),
                    sample::facility_amenities(&facility_id),
                    Vec::new(),
                )
            });

        self.sports = sports;
        self.amenities = amenities;
        self.photos = photos;
        self.detail_source = source;
    }

    async fn fetch_details(&self, facility_id: &str) -> Result<Details, GatewayError> {
        let by_facility = || ListQuery::new().filter("facility_id", facility_id);
        let (sports, amenities, photos) = tokio::join!(
            self.gateway.list_as::<FacilitySport>(Collection::FacilitySports, by_facility()),
            self.gateway.list_as::<FacilityAmenity>(Collection::FacilityAmenities, by_facility()),
            self.gateway.list_as::<FacilityPhoto>(Collection::FacilityPhotos, by_facility()),
        );
        Ok((sports?, amenities?, photos?))
    }

    pub fn selected(&self) -> Option<&Facility> {
        let id = self.selected.as_deref()?;
        self.facilities.iter().find(|f| f.id == id)
    }

    fn selected_id(&self) -> Result<String, ScreenError> {
        self.selected
            .clone()
            .ok_or(ScreenError::NotEditing("no facility selected"))
    }

    /// Blank facility for the "add" form.
    pub fn new_facility() -> Facility {
        Facility {
            id: millis_id("new"),
            country: "Spain".into(),
            ..Default::default()
        }
    }

    pub fn new_sport(&self) -> FacilitySport {
        FacilitySport {
            id: millis_id("new"),
            facility_id: self.selected.clone().unwrap_or_default(),
            equipment_list: "[]".into(),
            court_count: 1,
            max_players: 4,
            ..Default::default()
        }
    }

    /// Create (ids starting `new_`) or update a facility, then reload.
    pub async fn save_facility(&mut self, facility: Facility) -> Result<(), ScreenError> {
        let result = if facility.id.starts_with(NEW_PREFIX) {
            self.create_facility(facility).await
        } else {
            if !self.facilities.iter().any(|f| f.id == facility.id) {
                return Err(ScreenError::NotFound(format!("facility {}", facility.id)));
            }
            match owned_patch(&facility, "user_id") {
                Ok(patch) => self
                    .gateway
                    .update(Collection::Facilities, &facility.id, patch)
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            }
        };

        if let Err(e) = result {
            warn!("Failed to save facility: {}", e);
            return Err(e.into());
        }
        self.load().await;
        Ok(())
    }

    async fn create_facility(&mut self, facility: Facility) -> Result<(), GatewayError> {
        let user = self.gateway.me().await?;
        let record = Facility {
            id: millis_id("fac"),
            user_id: user.id,
            ..facility
        };
        let mut body = serde_json::to_value(&record)?;
        body["created_at"] = json!(timestamp::format(&local_now()));
        self.gateway.create(Collection::Facilities, body).await?;

        info!("Created facility {} ({})", record.id, record.name);
        self.selected = Some(record.id);
        Ok(())
    }

    /// Create (ids starting `new_`) or update a sport of the selected
    /// facility, then reload its details.
    pub async fn save_sport(&mut self, sport: FacilitySport) -> Result<(), ScreenError> {
        let facility_id = self.selected_id()?;
        let result = if sport.id.starts_with(NEW_PREFIX) {
            let record = FacilitySport {
                id: millis_id("spt"),
                facility_id,
                ..sport
            };
            self.gateway
                .create_record(Collection::FacilitySports, &record)
                .await
        } else {
            if !self.sports.iter().any(|s| s.id == sport.id) {
                return Err(ScreenError::NotFound(format!("sport {}", sport.id)));
            }
            match owned_patch(&sport, "facility_id") {
                Ok(patch) => self.gateway.update(Collection::FacilitySports, &sport.id, patch).await,
                Err(e) => Err(e),
            }
        };

        if let Err(e) = result {
            warn!("Failed to save sport: {}", e);
            return Err(e.into());
        }
        self.load_details().await;
        Ok(())
    }

    /// Add an amenity from the catalog (or a custom one) to the selected
    /// facility.
    pub async fn save_amenity(&mut self, amenity: FacilityAmenity) -> Result<(), ScreenError> {
        let facility_id = self.selected_id()?;
        let result = if amenity.id.is_empty() || amenity.id.starts_with(NEW_PREFIX) {
            let record = FacilityAmenity {
                id: millis_id("amn"),
                facility_id,
                ..amenity
            };
            self.gateway
                .create_record(Collection::FacilityAmenities, &record)
                .await
        } else {
            if !self.amenities.iter().any(|a| a.id == amenity.id) {
                return Err(ScreenError::NotFound(format!("amenity {}", amenity.id)));
            }
            match owned_patch(&amenity, "facility_id") {
                Ok(patch) => {
                    self.gateway
                        .update(Collection::FacilityAmenities, &amenity.id, patch)
                        .await
                }
                Err(e) => Err(e),
            }
        };

        if let Err(e) = result {
            warn!("Failed to save amenity: {}", e);
            return Err(e.into());
        }
        self.load_details().await;
        Ok(())
    }

    pub async fn toggle_amenity(&mut self, id: &str, available: bool) -> Result<(), ScreenError> {
        let Some(index) = self.amenities.iter().position(|a| a.id == id) else {
            return Err(ScreenError::NotFound(format!("amenity {}", id)));
        };
        if let Err(e) = self
            .gateway
            .update(
                Collection::FacilityAmenities,
                id,
                json!({ "is_available": u8::from(available) }),
            )
            .await
        {
            warn!("Failed to update amenity {}: {}", id, e);
            return Err(e.into());
        }

        self.amenities[index].is_available = available;
        Ok(())
    }

    /// Store a photo under `facilities/<facility>/<file name>` and record it.
    /// The first photo of a facility becomes its primary one.
    pub async fn upload_photo(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        sport_type: Option<&str>,
    ) -> Result<FacilityPhoto, ScreenError> {
        let facility_id = self.selected_id()?;
        if file_name.is_empty() || file_name.contains('/') {
            return Err(ScreenError::Invalid(format!("file name '{}'", file_name)));
        }

        let path = format!("facilities/{}/{}", facility_id, file_name);
        let photo_url = match self
            .gateway
            .upload(bytes, &path, UploadOptions { upsert: true })
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!("Failed to upload {}: {}", path, e);
                return Err(e.into());
            }
        };

        let photo = FacilityPhoto {
            id: millis_id("photo"),
            facility_id,
            photo_url,
            caption: file_name.to_string(),
            sport_type: sport_type.unwrap_or_default().to_string(),
            is_primary: self.photos.is_empty(),
        };
        if let Err(e) = self
            .gateway
            .create_record(Collection::FacilityPhotos, &photo)
            .await
        {
            warn!("Failed to record photo {}: {}", photo.id, e);
            return Err(e.into());
        }

        self.load_details().await;
        Ok(photo)
    }

    pub fn view(&self) -> FacilityEditorView {
        FacilityEditorView {
            loading: self.loading,
            source: self.source,
            detail_source: self.detail_source,
            facilities: self.facilities.clone(),
            selected: self.selected().cloned(),
            sports: self
                .sports
                .iter()
                .map(|sport| SportView {
                    equipment: sport.equipment_items(),
                    sport: sport.clone(),
                })
                .collect(),
            amenities: self.amenities.clone(),
            photos: self.photos.clone(),
            sport_options: &SPORT_OPTIONS,
            amenity_options: &AMENITY_OPTIONS,
        }
    }
}

/// Encode a record as an update patch without its owner field, so a save
/// can never move the record to another owner.
fn owned_patch<T: Serialize>(record: &T, owner: &str) -> Result<serde_json::Value, GatewayError> {
    let mut patch = serde_json::to_value(record)?;
    if let Some(fields) = patch.as_object_mut() {
        fields.remove(owner);
    }
    Ok(patch)
}
