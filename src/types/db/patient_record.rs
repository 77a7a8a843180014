use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "patient_records")]
pub struct Model {
    /// Same identifier space as users.id (1:1 with the patient's login row)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub age: i32,

    // "Pending" until the first prediction, then "High Risk" / "Low Risk"
    pub risk_status: String,

    // Formatted percentage string with one decimal place, "N/A" until predicted
    pub last_probability: String,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::clinical_note::Entity")]
    ClinicalNote,
    #[sea_orm(has_many = "super::biopsy_image::Entity")]
    BiopsyImage,
}

impl Related<super::clinical_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClinicalNote.def()
    }
}

impl Related<super::biopsy_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BiopsyImage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
