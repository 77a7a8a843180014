use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "biopsy_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub patient_id: String,

    // Sanitized name the bytes were written under in the upload directory
    pub stored_filename: String,
    pub original_filename: String,

    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patient_record::Entity",
        from = "Column::PatientId",
        to = "super::patient_record::Column::Id"
    )]
    PatientRecord,
}

impl Related<super::patient_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PatientRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
