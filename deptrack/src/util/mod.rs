pub(crate) mod clone_as_boxstr;
pub(crate) mod path_cmp;
pub(crate) mod pathbuf;
