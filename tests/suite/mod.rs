mod config;
mod fun_facts;
mod verification;
