use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create patient_records table (1:1 with users rows of role=patient)
        manager
            .create_table(
                Table::create()
                    .table(PatientRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PatientRecords::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(PatientRecords::Name).string().not_null())
                    .col(ColumnDef::new(PatientRecords::Age).integer().not_null())
                    .col(
                        ColumnDef::new(PatientRecords::RiskStatus)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(PatientRecords::LastProbability)
                            .string()
                            .not_null()
                            .default("N/A"),
                    )
                    .col(ColumnDef::new(PatientRecords::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PatientRecords::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patient_records_user_id")
                            .from(PatientRecords::Table, PatientRecords::Id)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create clinical_notes table (append-only note log)
        manager
            .create_table(
                Table::create()
                    .table(ClinicalNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClinicalNotes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClinicalNotes::PatientId).string().not_null())
                    .col(ColumnDef::new(ClinicalNotes::AuthorName).string().not_null())
                    .col(ColumnDef::new(ClinicalNotes::Body).text().not_null())
                    .col(ColumnDef::new(ClinicalNotes::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clinical_notes_patient_id")
                            .from(ClinicalNotes::Table, ClinicalNotes::PatientId)
                            .to(PatientRecords::Table, PatientRecords::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clinical_notes_patient_id")
                    .table(ClinicalNotes::Table)
                    .col(ClinicalNotes::PatientId)
                    .to_owned(),
            )
            .await?;

        // Create biopsy_images table (append-only image reference log)
        manager
            .create_table(
                Table::create()
                    .table(BiopsyImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BiopsyImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BiopsyImages::PatientId).string().not_null())
                    .col(ColumnDef::new(BiopsyImages::StoredFilename).string().not_null())
                    .col(ColumnDef::new(BiopsyImages::OriginalFilename).string().not_null())
                    .col(ColumnDef::new(BiopsyImages::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_biopsy_images_patient_id")
                            .from(BiopsyImages::Table, BiopsyImages::PatientId)
                            .to(PatientRecords::Table, PatientRecords::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_biopsy_images_patient_id")
                    .table(BiopsyImages::Table)
                    .col(BiopsyImages::PatientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BiopsyImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClinicalNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PatientRecords::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PatientRecords {
    Table,
    Id,
    Name,
    Age,
    RiskStatus,
    LastProbability,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClinicalNotes {
    Table,
    Id,
    PatientId,
    AuthorName,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BiopsyImages {
    Table,
    Id,
    PatientId,
    StoredFilename,
    OriginalFilename,
    CreatedAt,
}
