pub mod challenge;
pub mod silent;
pub mod timing;
pub mod turn;
pub mod typing;
