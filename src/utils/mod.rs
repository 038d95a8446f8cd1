pub mod db_utils;
pub mod department_cache;
