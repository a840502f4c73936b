//! Built-in products.

pub mod alive;
pub mod cmake_product;
pub mod llvm;
pub mod swift;
pub mod z3;

pub use alive::Alive;
pub use llvm::Llvm;
pub use swift::Swift;
pub use z3::Z3;
