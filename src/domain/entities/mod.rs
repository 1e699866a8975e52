pub mod waitlist_entry;
