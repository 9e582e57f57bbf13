pub mod post_order;
