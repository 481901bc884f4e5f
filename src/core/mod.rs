pub mod batch;

pub mod grade;

pub mod intake;

pub mod item;

pub mod product;

pub mod sku;
