pub mod modint;
