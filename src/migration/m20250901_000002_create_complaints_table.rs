use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Id,
    UserPhone,
    Name,
    Phone,
    District,
    Block,
    Gp,
    Village,
    Landmark,
    Pincode,
    Department,
    Complaint,
    Proof,
    Status,
    AdminProof,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Complaints::UserPhone)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Complaints::Name).string().not_null())
                    .col(ColumnDef::new(Complaints::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Complaints::District).string().not_null())
                    .col(ColumnDef::new(Complaints::Block).string().not_null())
                    .col(ColumnDef::new(Complaints::Gp).string().not_null())
                    .col(ColumnDef::new(Complaints::Village).string().not_null())
                    .col(ColumnDef::new(Complaints::Landmark).string().not_null())
                    .col(
                        ColumnDef::new(Complaints::Pincode)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Complaints::Department).string().not_null())
                    .col(ColumnDef::new(Complaints::Complaint).text().not_null())
                    .col(ColumnDef::new(Complaints::Proof).string().null())
                    .col(
                        ColumnDef::new(Complaints::Status)
                            .string_len(20)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Complaints::AdminProof).string().null())
                    .col(ColumnDef::new(Complaints::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaints::Table).to_owned())
            .await
    }
}
