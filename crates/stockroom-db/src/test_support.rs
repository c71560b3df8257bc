//! Fixtures shared by the database tests.

use stockroom_core::forms::{Credentials, ManufacturerDraft, ProductDraft};
use stockroom_core::{Manufacturer, Product, User};

use crate::{Database, DbConfig};

pub async fn manufacturer(db: &Database, name: &str) -> Manufacturer {
    db.manufacturers()
        .create(ManufacturerDraft {
            name: name.to_string(),
            contact: None,
            street_number: None,
            street: None,
            zip: None,
            bldg: None,
        })
        .await
        .unwrap()
}

pub async fn product(db: &Database, maker: &Manufacturer, name: &str, opening: i64) -> Product {
    db.products()
        .create(ProductDraft {
            name: name.to_string(),
            common_name: None,
            manufacturer_id: maker.id.clone(),
            image_link: None,
            opening_quantity: opening,
        })
        .await
        .unwrap()
}

/// An in-memory database with one user, one manufacturer and one product.
pub struct Fixture {
    pub db: Database,
    pub user: User,
    pub maker: Manufacturer,
    pub product: Product,
}

impl Fixture {
    pub async fn product_named(&self, name: &str, opening: i64) -> Product {
        product(&self.db, &self.maker, name, opening).await
    }
}

pub async fn fixture(opening: i64) -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let user = db
        .users()
        .create(&Credentials {
            email: "admin@stockroom.local".to_string(),
            password: "adm1n-pass!".to_string(),
        })
        .await
        .unwrap();
    let maker = manufacturer(&db, "dat").await;
    let product = product(&db, &maker, "fuhouan", opening).await;

    Fixture {
        db,
        user,
        maker,
        product,
    }
}
