pub mod accessory;
pub mod computer;
pub mod computer_part;
pub mod laboratory;
pub mod report;
pub mod technician_log;
pub mod user;

pub use computer_part::{PartKind, PartStatus};
pub use report::ReportStatus;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::accessory::{self, Entity as Accessory};
    pub use super::computer::{self, Entity as Computer};
    pub use super::computer_part::{self, Entity as ComputerPart};
    pub use super::laboratory::{self, Entity as Laboratory};
    pub use super::report::{self, Entity as Report};
    pub use super::technician_log::{self, Entity as TechnicianLog};
    pub use super::user::{self, Entity as User};
}
