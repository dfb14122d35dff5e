pub mod caching;
pub mod fetcher;
pub mod fred;
pub mod openai;
pub mod util;
pub mod yahoo_finance;
