//! `SeaORM` entity definitions.
//!
//! Table and column names are the association's existing schema and are
//! kept verbatim.

pub mod aidat_odemeleri;
pub mod aidat_takip;
pub mod devir_islemleri;
pub mod gelirler;
pub mod giderler;
pub mod kasalar;
pub mod tahakkuklar;
pub mod uyeler;
pub mod virmanlar;

pub mod prelude {
    //! Entity aliases.

    pub use super::aidat_odemeleri::Entity as AidatOdemeleri;
    pub use super::aidat_takip::Entity as AidatTakip;
    pub use super::devir_islemleri::Entity as DevirIslemleri;
    pub use super::gelirler::Entity as Gelirler;
    pub use super::giderler::Entity as Giderler;
    pub use super::kasalar::Entity as Kasalar;
    pub use super::tahakkuklar::Entity as Tahakkuklar;
    pub use super::uyeler::Entity as Uyeler;
    pub use super::virmanlar::Entity as Virmanlar;
}
