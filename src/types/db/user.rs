use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Login identifier; shared with patient_records for patient accounts
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,

    // One of: admin, doctor, radiologist, patient
    pub role: String,

    // Argon2id PHC string, never the raw credential
    pub password_hash: String,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
