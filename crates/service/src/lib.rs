//! Swapflow Service
//!
//! The orchestration layer: pair/amount state with replay-latest streams, the
//! reactive quote-recomputation pipeline, transfer-requirement resolution,
//! on-chain rate aggregation and the persisted order repository.

pub mod amounts;
pub mod context;
pub mod orders;
pub mod pair_holder;
pub mod rates;
pub mod token_context;
pub mod transfer;
pub mod wrap;

pub use amounts::MaxAmountSource;
pub use context::{ContextError, SwapContext};
pub use orders::OrderBook;
pub use pair_holder::PairHolder;
pub use rates::RateProvider;
pub use token_context::TokenContext;
pub use transfer::{ApprovalResolver, Permit2Resolver, TransferRequirementPipeline};
pub use wrap::NativeWrapResolver;
