pub mod member_repository;
pub mod month_repository;
pub mod payment_repository;

pub use member_repository::MemberRepository;
pub use month_repository::MonthRepository;
pub use payment_repository::PaymentRepository;
