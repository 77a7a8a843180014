use crate::errors::internal::{InternalError, PatientError};
use crate::types::db::biopsy_image::{
    self, ActiveModel as BiopsyImageActiveModel, Entity as BiopsyImage,
};
use crate::types::db::clinical_note::{
    self, ActiveModel as ClinicalNoteActiveModel, Entity as ClinicalNote,
};
use crate::types::db::patient_record::{
    self, ActiveModel as PatientRecordActiveModel, Entity as PatientRecord,
};
use crate::types::db::user::{ActiveModel as UserActiveModel, Entity as User};
use crate::types::internal::auth::{AuthenticatedUser, Role};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// One patient record together with its append-only note and image logs
#[derive(Debug, Clone)]
pub struct PatientBundle {
    pub record: patient_record::Model,
    pub notes: Vec<clinical_note::Model>,
    pub images: Vec<biopsy_image::Model>,
}

/// PatientStore manages patient records and their note/image logs
///
/// Records are never deleted; the note and image logs only grow. Creation
/// writes the identity row and the record row in one transaction so a crash
/// cannot leave an orphaned login without a record.
pub struct PatientStore {
    db: DatabaseConnection,
}

impl PatientStore {
    /// Create a new PatientStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a patient login and its paired record atomically
    ///
    /// The duplicate check runs against the identity table inside the same
    /// transaction as both inserts.
    ///
    /// # Arguments
    /// * `id` - New patient identifier (also the login username)
    /// * `name` - Display name
    /// * `age` - Age in years
    /// * `password_hash` - Pre-hashed credential from the credential store
    ///
    /// # Returns
    /// * `Ok(())` - Both rows committed
    /// * `Err(InternalError::Patient(DuplicateId))` - Identifier already taken
    pub async fn create(
        &self,
        id: &str,
        name: &str,
        age: i32,
        password_hash: String,
    ) -> Result<(), InternalError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| InternalError::transaction("create patient", e))?;

        let existing = User::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| InternalError::database("find user", e))?;
        if existing.is_some() {
            return Err(InternalError::from(PatientError::DuplicateId(id.to_string())));
        }

        let now = Utc::now().timestamp();

        let new_user = UserActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            role: Set(Role::Patient.as_str().to_string()),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };
        new_user
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("insert user", e))?;

        let new_record = PatientRecordActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            age: Set(age),
            risk_status: Set("Pending".to_string()),
            last_probability: Set("N/A".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        new_record
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("insert patient record", e))?;

        txn.commit()
            .await
            .map_err(|e| InternalError::transaction("create patient", e))?;

        Ok(())
    }

    /// Append an author-attributed note to a patient's log
    ///
    /// # Returns
    /// * `Err(InternalError::Patient(NotFound))` - Unknown patient id;
    ///   nothing is created
    pub async fn append_note(
        &self,
        patient_id: &str,
        author_name: &str,
        body: &str,
    ) -> Result<(), InternalError> {
        self.require_record(patient_id).await?;

        let note = ClinicalNoteActiveModel {
            patient_id: Set(patient_id.to_string()),
            author_name: Set(author_name.to_string()),
            body: Set(body.to_string()),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        note.insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert clinical note", e))?;

        Ok(())
    }

    /// Append a stored image reference to a patient's log
    ///
    /// The bytes are already on disk when this runs; the caller removes the
    /// file again if this insert fails.
    pub async fn append_image_ref(
        &self,
        patient_id: &str,
        stored_filename: &str,
        original_filename: &str,
    ) -> Result<(), InternalError> {
        self.require_record(patient_id).await?;

        let image = BiopsyImageActiveModel {
            patient_id: Set(patient_id.to_string()),
            stored_filename: Set(stored_filename.to_string()),
            original_filename: Set(original_filename.to_string()),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        image
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert biopsy image", e))?;

        Ok(())
    }

    /// Overwrite the record's risk status with a fresh prediction
    ///
    /// The stored probability is a percentage string with one decimal place.
    pub async fn record_prediction(
        &self,
        patient_id: &str,
        status_label: &str,
        probability: f64,
    ) -> Result<(), InternalError> {
        let record = self.require_record(patient_id).await?;

        let mut active: PatientRecordActiveModel = record.into();
        active.risk_status = Set(status_label.to_string());
        active.last_probability = Set(format!("{:.1}%", probability * 100.0));
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("update patient record", e))?;

        Ok(())
    }

    /// Fetch one record with its note and image logs
    pub async fn get(&self, patient_id: &str) -> Result<Option<PatientBundle>, InternalError> {
        let record = PatientRecord::find_by_id(patient_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find patient record", e))?;

        match record {
            Some(record) => Ok(Some(self.load_bundle(record).await?)),
            None => Ok(None),
        }
    }

    /// Fetch the records visible to the caller
    ///
    /// Staff roles see every record; a patient only ever sees their own.
    pub async fn get_all_for(
        &self,
        viewer: &AuthenticatedUser,
    ) -> Result<Vec<PatientBundle>, InternalError> {
        let records = if viewer.role == Role::Patient {
            PatientRecord::find_by_id(viewer.id.as_str())
                .all(&self.db)
                .await
                .map_err(|e| InternalError::database("find patient record", e))?
        } else {
            PatientRecord::find()
                .order_by_asc(patient_record::Column::Id)
                .all(&self.db)
                .await
                .map_err(|e| InternalError::database("list patient records", e))?
        };

        let mut bundles = Vec::with_capacity(records.len());
        for record in records {
            bundles.push(self.load_bundle(record).await?);
        }
        Ok(bundles)
    }

    async fn load_bundle(
        &self,
        record: patient_record::Model,
    ) -> Result<PatientBundle, InternalError> {
        let notes = ClinicalNote::find()
            .filter(clinical_note::Column::PatientId.eq(&record.id))
            .order_by_asc(clinical_note::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list clinical notes", e))?;

        let images = BiopsyImage::find()
            .filter(biopsy_image::Column::PatientId.eq(&record.id))
            .order_by_asc(biopsy_image::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list biopsy images", e))?;

        Ok(PatientBundle {
            record,
            notes,
            images,
        })
    }

    async fn require_record(
        &self,
        patient_id: &str,
    ) -> Result<patient_record::Model, InternalError> {
        PatientRecord::find_by_id(patient_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find patient record", e))?
            .ok_or_else(|| InternalError::from(PatientError::NotFound(patient_id.to_string())))
    }
}

impl std::fmt::Debug for PatientStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientStore")
            .field("db", &"<connection>")
            .finish()
    }
}
