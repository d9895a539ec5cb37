//! Default source archive locations

/// libxml2 source archive
pub const LIBXML2_URL: &str =
    "https://download.gnome.org/sources/libxml2/2.9/libxml2-2.9.14.tar.xz";

/// libxslt source archive
pub const LIBXSLT_URL: &str =
    "https://download.gnome.org/sources/libxslt/1.1/libxslt-1.1.35.tar.xz";

/// lxml source distribution
pub const LXML_URL: &str =
    "https://files.pythonhosted.org/packages/source/l/lxml/lxml-4.9.4.tar.gz";
