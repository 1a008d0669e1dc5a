//! DOM element schema
//!
//! Known DOM elements and their properties, used to check element names and
//! property bindings that no directive claims.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Schemas relaxing the DOM checks of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaMetadata {
    /// Any element with a dash in its name, and any property on it.
    CustomElementsSchema,
    /// Any element and any property.
    NoErrorsSchema,
}

/// DOM schema encoding inheritance, properties and events.
///
/// ## Format:
/// Each line: `element_inheritance|properties`
///
/// - Elements separated by `,` have identical properties
/// - `^parentElement` indicates inheritance
/// - Property prefixes:
///   - (no prefix): string property
///   - `*`: event
///   - `!`: boolean
///   - `#`: number
///   - `%`: object
pub static SCHEMA: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "[Element]|textContent,%ariaActiveDescendantElement,%ariaAtomic,%ariaAutoComplete,%ariaBusy,%ariaChecked,%ariaColCount,%ariaColIndex,%ariaColIndexText,%ariaColSpan,%ariaControlsElements,%ariaCurrent,%ariaDescribedByElements,%ariaDescription,%ariaDetailsElements,%ariaDisabled,%ariaErrorMessageElements,%ariaExpanded,%ariaFlowToElements,%ariaHasPopup,%ariaHidden,%ariaInvalid,%ariaKeyShortcuts,%ariaLabel,%ariaLabelledByElements,%ariaLevel,%ariaLive,%ariaModal,%ariaMultiLine,%ariaMultiSelectable,%ariaOrientation,%ariaOwnsElements,%ariaPlaceholder,%ariaPosInSet,%ariaPressed,%ariaReadOnly,%ariaRelevant,%ariaRequired,%ariaRoleDescription,%ariaRowCount,%ariaRowIndex,%ariaRowIndexText,%ariaRowSpan,%ariaSelected,%ariaSetSize,%ariaSort,%ariaValueMax,%ariaValueMin,%ariaValueNow,%ariaValueText,%classList,className,elementTiming,id,innerHTML,*beforecopy,*beforecut,*beforepaste,*fullscreenchange,*fullscreenerror,*search,*webkitfullscreenchange,*webkitfullscreenerror,outerHTML,%part,#scrollLeft,#scrollTop,slot,*message,*mozfullscreenchange,*mozfullscreenerror,*mozpointerlockchange,*mozpointerlockerror,*webglcontextcreationerror,*webglcontextlost,*webglcontextrestored",
        "[HTMLElement]^[Element]|accessKey,autocapitalize,!autofocus,contentEditable,dir,!draggable,enterKeyHint,!hidden,!inert,innerText,inputMode,lang,nonce,*abort,*animationend,*animationiteration,*animationstart,*auxclick,*beforexrselect,*blur,*cancel,*canplay,*canplaythrough,*change,*click,*close,*contextmenu,*copy,*cuechange,*cut,*dblclick,*drag,*dragend,*dragenter,*dragleave,*dragover,*dragstart,*drop,*durationchange,*emptied,*ended,*error,*focus,*formdata,*gotpointercapture,*input,*invalid,*keydown,*keypress,*keyup,*load,*loadeddata,*loadedmetadata,*loadstart,*lostpointercapture,*mousedown,*mouseenter,*mouseleave,*mousemove,*mouseout,*mouseover,*mouseup,*mousewheel,*paste,*pause,*play,*playing,*pointercancel,*pointerdown,*pointerenter,*pointerleave,*pointermove,*pointerout,*pointerover,*pointerrawupdate,*pointerup,*progress,*ratechange,*reset,*resize,*scroll,*securitypolicyviolation,*seeked,*seeking,*select,*selectionchange,*selectstart,*slotchange,*stalled,*submit,*suspend,*timeupdate,*toggle,*transitioncancel,*transitionend,*transitionrun,*transitionstart,*volumechange,*waiting,*webkitanimationend,*webkitanimationiteration,*webkitanimationstart,*webkittransitionend,*wheel,outerText,!spellcheck,%style,#tabIndex,title,!translate,virtualKeyboardPolicy",
        "abbr,address,article,aside,b,bdi,bdo,cite,content,code,dd,dfn,dt,em,figcaption,figure,footer,header,hgroup,i,kbd,main,mark,nav,noscript,rb,rp,rt,rtc,ruby,s,samp,search,section,small,strong,sub,sup,u,var,wbr^[HTMLElement]|accessKey,autocapitalize,!autofocus,contentEditable,dir,!draggable,enterKeyHint,!hidden,innerText,inputMode,lang,nonce,*abort,*animationend,*animationiteration,*animationstart,*auxclick,*beforexrselect,*blur,*cancel,*canplay,*canplaythrough,*change,*click,*close,*contextmenu,*copy,*cuechange,*cut,*dblclick,*drag,*dragend,*dragenter,*dragleave,*dragover,*dragstart,*drop,*durationchange,*emptied,*ended,*error,*focus,*formdata,*gotpointercapture,*input,*invalid,*keydown,*keypress,*keyup,*load,*loadeddata,*loadedmetadata,*loadstart,*lostpointercapture,*mousedown,*mouseenter,*mouseleave,*mousemove,*mouseout,*mouseover,*mouseup,*mousewheel,*paste,*pause,*play,*playing,*pointercancel,*pointerdown,*pointerenter,*pointerleave,*pointermove,*pointerout,*pointerover,*pointerrawupdate,*pointerup,*progress,*ratechange,*reset,*resize,*scroll,*securitypolicyviolation,*seeked,*seeking,*select,*selectionchange,*selectstart,*slotchange,*stalled,*submit,*suspend,*timeupdate,*toggle,*transitioncancel,*transitionend,*transitionrun,*transitionstart,*volumechange,*waiting,*webkitanimationend,*webkitanimationiteration,*webkitanimationstart,*webkittransitionend,*wheel,outerText,!spellcheck,%style,#tabIndex,title,!translate,virtualKeyboardPolicy",
        "media^[HTMLElement]|!autoplay,!controls,%controlsList,%crossOrigin,#currentTime,!defaultMuted,#defaultPlaybackRate,!disableRemotePlayback,!loop,!muted,*encrypted,*waitingforkey,#playbackRate,preload,!preservesPitch,src,%srcObject,#volume",
        ":svg:^[HTMLElement]|!autofocus,nonce,*abort,*animationend,*animationiteration,*animationstart,*auxclick,*beforexrselect,*blur,*cancel,*canplay,*canplaythrough,*change,*click,*close,*contextmenu,*copy,*cuechange,*cut,*dblclick,*drag,*dragend,*dragenter,*dragleave,*dragover,*dragstart,*drop,*durationchange,*emptied,*ended,*error,*focus,*formdata,*gotpointercapture,*input,*invalid,*keydown,*keypress,*keyup,*load,*loadeddata,*loadedmetadata,*loadstart,*lostpointercapture,*mousedown,*mouseenter,*mouseleave,*mousemove,*mouseout,*mouseover,*mouseup,*mousewheel,*paste,*pause,*play,*playing,*pointercancel,*pointerdown,*pointerenter,*pointerleave,*pointermove,*pointerout,*pointerover,*pointerrawupdate,*pointerup,*progress,*ratechange,*reset,*resize,*scroll,*securitypolicyviolation,*seeked,*seeking,*select,*selectionchange,*selectstart,*slotchange,*stalled,*submit,*suspend,*timeupdate,*toggle,*transitioncancel,*transitionend,*transitionrun,*transitionstart,*volumechange,*waiting,*webkitanimationend,*webkitanimationiteration,*webkitanimationstart,*webkittransitionend,*wheel,%style,#tabIndex",
        ":svg:graphics^:svg:|",
        ":svg:animation^:svg:|*begin,*end,*repeat",
        ":svg:geometry^:svg:|",
        ":svg:componentTransferFunction^:svg:|",
        ":svg:gradient^:svg:|",
        ":svg:textContent^:svg:graphics|",
        ":svg:textPositioning^:svg:textContent|",
        "a^[HTMLElement]|charset,coords,download,hash,host,hostname,href,hreflang,name,password,pathname,ping,port,protocol,referrerPolicy,rel,%relList,rev,search,shape,target,text,type,username",
        "area^[HTMLElement]|alt,coords,download,hash,host,hostname,href,!noHref,password,pathname,ping,port,protocol,referrerPolicy,rel,%relList,search,shape,target,username",
        "audio^media|",
        "br^[HTMLElement]|clear",
        "base^[HTMLElement]|href,target",
        "body^[HTMLElement]|aLink,background,bgColor,link,*afterprint,*beforeprint,*beforeunload,*blur,*error,*focus,*hashchange,*languagechange,*load,*message,*messageerror,*offline,*online,*pagehide,*pageshow,*popstate,*rejectionhandled,*resize,*scroll,*storage,*unhandledrejection,*unload,text,vLink",
        "button^[HTMLElement]|!disabled,formAction,formEnctype,formMethod,!formNoValidate,formTarget,name,type,value",
        "canvas^[HTMLElement]|#height,#width",
        "content^[HTMLElement]|select",
        "dl^[HTMLElement]|!compact",
        "data^[HTMLElement]|value",
        "datalist^[HTMLElement]|",
        "details^[HTMLElement]|!open",
        "dialog^[HTMLElement]|!open,returnValue",
        "dir^[HTMLElement]|!compact",
        "div^[HTMLElement]|align",
        "embed^[HTMLElement]|align,height,name,src,type,width",
        "fieldset^[HTMLElement]|!disabled,name",
        "font^[HTMLElement]|color,face,size",
        "form^[HTMLElement]|acceptCharset,action,autocomplete,encoding,enctype,method,name,!noValidate,target",
        "frame^[HTMLElement]|frameBorder,longDesc,marginHeight,marginWidth,name,!noResize,scrolling,src",
        "frameset^[HTMLElement]|cols,*afterprint,*beforeprint,*beforeunload,*blur,*error,*focus,*hashchange,*languagechange,*load,*message,*messageerror,*offline,*online,*pagehide,*pageshow,*popstate,*rejectionhandled,*resize,*scroll,*storage,*unhandledrejection,*unload,rows",
        "hr^[HTMLElement]|align,color,!noShade,size,width",
        "head^[HTMLElement]|",
        "h1,h2,h3,h4,h5,h6^[HTMLElement]|align",
        "html^[HTMLElement]|version",
        "iframe^[HTMLElement]|align,allow,!allowFullscreen,!allowPaymentRequest,csp,frameBorder,height,loading,longDesc,marginHeight,marginWidth,name,referrerPolicy,%sandbox,scrolling,src,srcdoc,width",
        "img^[HTMLElement]|align,alt,border,%crossOrigin,decoding,#height,#hspace,!isMap,loading,longDesc,lowsrc,name,referrerPolicy,sizes,src,srcset,useMap,#vspace,#width",
        "input^[HTMLElement]|accept,align,alt,autocomplete,!checked,!defaultChecked,defaultValue,dirName,!disabled,%files,formAction,formEnctype,formMethod,!formNoValidate,formTarget,#height,!incremental,!indeterminate,max,#maxLength,min,#minLength,!multiple,name,pattern,placeholder,!readOnly,!required,selectionDirection,#selectionEnd,#selectionStart,#size,src,step,type,useMap,value,%valueAsDate,#valueAsNumber,#width",
        "li^[HTMLElement]|type,#value",
        "label^[HTMLElement]|htmlFor",
        "legend^[HTMLElement]|align",
        "link^[HTMLElement]|as,charset,%crossOrigin,!disabled,href,hreflang,imageSizes,imageSrcset,integrity,media,referrerPolicy,rel,%relList,rev,%sizes,target,type",
        "map^[HTMLElement]|name",
        "marquee^[HTMLElement]|behavior,bgColor,direction,height,#hspace,#loop,#scrollAmount,#scrollDelay,!trueSpeed,#vspace,width",
        "menu^[HTMLElement]|!compact",
        "meta^[HTMLElement]|content,httpEquiv,media,name,scheme",
        "meter^[HTMLElement]|#high,#low,#max,#min,#optimum,#value",
        "ins,del^[HTMLElement]|cite,dateTime",
        "ol^[HTMLElement]|!compact,!reversed,#start,type",
        "object^[HTMLElement]|align,archive,border,code,codeBase,codeType,data,!declare,height,#hspace,name,standby,type,useMap,#vspace,width",
        "optgroup^[HTMLElement]|!disabled,label",
        "option^[HTMLElement]|!defaultSelected,!disabled,label,!selected,text,value",
        "output^[HTMLElement]|defaultValue,%htmlFor,name,value",
        "p^[HTMLElement]|align",
        "param^[HTMLElement]|name,type,value,valueType",
        "picture^[HTMLElement]|",
        "pre^[HTMLElement]|#width",
        "progress^[HTMLElement]|#max,#value",
        "q,blockquote,cite^[HTMLElement]|",
        "script^[HTMLElement]|!async,charset,%crossOrigin,!defer,event,htmlFor,integrity,!noModule,%referrerPolicy,src,text,type",
        "select^[HTMLElement]|autocomplete,!disabled,#length,!multiple,name,!required,#selectedIndex,#size,value",
        "selectedcontent^[HTMLElement]|",
        "slot^[HTMLElement]|name",
        "source^[HTMLElement]|#height,media,sizes,src,srcset,type,#width",
        "span^[HTMLElement]|",
        "style^[HTMLElement]|!disabled,media,type",
        "search^[HTMLELement]|",
        "caption^[HTMLElement]|align",
        "th,td^[HTMLElement]|abbr,align,axis,bgColor,ch,chOff,#colSpan,headers,height,!noWrap,#rowSpan,scope,vAlign,width",
        "col,colgroup^[HTMLElement]|align,ch,chOff,#span,vAlign,width",
        "table^[HTMLElement]|align,bgColor,border,%caption,cellPadding,cellSpacing,frame,rules,summary,%tFoot,%tHead,width",
        "tr^[HTMLElement]|align,bgColor,ch,chOff,vAlign",
        "tfoot,thead,tbody^[HTMLElement]|align,ch,chOff,vAlign",
        "template^[HTMLElement]|",
        "textarea^[HTMLElement]|autocomplete,#cols,defaultValue,dirName,!disabled,#maxLength,#minLength,name,placeholder,!readOnly,!required,#rows,selectionDirection,#selectionEnd,#selectionStart,value,wrap",
        "time^[HTMLElement]|dateTime",
        "title^[HTMLElement]|text",
        "track^[HTMLElement]|!default,kind,label,src,srclang",
        "ul^[HTMLElement]|!compact,type",
        "unknown^[HTMLElement]|",
        "video^media|!disablePictureInPicture,#height,*enterpictureinpicture,*leavepictureinpicture,!playsInline,poster,#width",
        ":svg:a^:svg:graphics|",
        ":svg:animate^:svg:animation|",
        ":svg:animateMotion^:svg:animation|",
        ":svg:animateTransform^:svg:animation|",
        ":svg:circle^:svg:geometry|",
        ":svg:clipPath^:svg:graphics|",
        ":svg:defs^:svg:graphics|",
        ":svg:desc^:svg:|",
        ":svg:discard^:svg:|",
        ":svg:ellipse^:svg:geometry|",
        ":svg:feBlend^:svg:|",
        ":svg:feColorMatrix^:svg:|",
        ":svg:feComponentTransfer^:svg:|",
        ":svg:feComposite^:svg:|",
        ":svg:feConvolveMatrix^:svg:|",
        ":svg:feDiffuseLighting^:svg:|",
        ":svg:feDisplacementMap^:svg:|",
        ":svg:feDistantLight^:svg:|",
        ":svg:feDropShadow^:svg:|",
        ":svg:feFlood^:svg:|",
        ":svg:feFuncA^:svg:componentTransferFunction|",
        ":svg:feFuncB^:svg:componentTransferFunction|",
        ":svg:feFuncG^:svg:componentTransferFunction|",
        ":svg:feFuncR^:svg:componentTransferFunction|",
        ":svg:feGaussianBlur^:svg:|",
        ":svg:feImage^:svg:|",
        ":svg:feMerge^:svg:|",
        ":svg:feMergeNode^:svg:|",
        ":svg:feMorphology^:svg:|",
        ":svg:feOffset^:svg:|",
        ":svg:fePointLight^:svg:|",
        ":svg:feSpecularLighting^:svg:|",
        ":svg:feSpotLight^:svg:|",
        ":svg:feTile^:svg:|",
        ":svg:feTurbulence^:svg:|",
        ":svg:filter^:svg:|",
        ":svg:foreignObject^:svg:graphics|",
        ":svg:g^:svg:graphics|",
        ":svg:image^:svg:graphics|decoding",
        ":svg:line^:svg:geometry|",
        ":svg:linearGradient^:svg:gradient|",
        ":svg:mpath^:svg:|",
        ":svg:marker^:svg:|",
        ":svg:mask^:svg:|",
        ":svg:metadata^:svg:|",
        ":svg:path^:svg:geometry|",
        ":svg:pattern^:svg:|",
        ":svg:polygon^:svg:geometry|",
        ":svg:polyline^:svg:geometry|",
        ":svg:radialGradient^:svg:gradient|",
        ":svg:rect^:svg:geometry|",
        ":svg:svg^:svg:graphics|#currentScale,#zoomAndPan",
        ":svg:script^:svg:|type",
        ":svg:set^:svg:animation|",
        ":svg:stop^:svg:|",
        ":svg:style^:svg:|!disabled,media,title,type",
        ":svg:switch^:svg:graphics|",
        ":svg:symbol^:svg:|",
        ":svg:tspan^:svg:textPositioning|",
        ":svg:text^:svg:textPositioning|",
        ":svg:textPath^:svg:textContent|",
        ":svg:title^:svg:|",
        ":svg:use^:svg:graphics|",
        ":svg:view^:svg:|#zoomAndPan",
        "data^[HTMLElement]|value",
        "keygen^[HTMLElement]|!autofocus,challenge,!disabled,form,keytype,name",
        "menuitem^[HTMLElement]|type,label,icon,!disabled,!checked,radiogroup,!default",
        "summary^[HTMLElement]|",
        "time^[HTMLElement]|dateTime",
        ":svg:cursor^:svg:|",
        ":math:^[HTMLElement]|!autofocus,nonce,*abort,*animationend,*animationiteration,*animationstart,*auxclick,*beforeinput,*beforematch,*beforetoggle,*beforexrselect,*blur,*cancel,*canplay,*canplaythrough,*change,*click,*close,*contentvisibilityautostatechange,*contextlost,*contextmenu,*contextrestored,*copy,*cuechange,*cut,*dblclick,*drag,*dragend,*dragenter,*dragleave,*dragover,*dragstart,*drop,*durationchange,*emptied,*ended,*error,*focus,*formdata,*gotpointercapture,*input,*invalid,*keydown,*keypress,*keyup,*load,*loadeddata,*loadedmetadata,*loadstart,*lostpointercapture,*mousedown,*mouseenter,*mouseleave,*mousemove,*mouseout,*mouseover,*mouseup,*mousewheel,*paste,*pause,*play,*playing,*pointercancel,*pointerdown,*pointerenter,*pointerleave,*pointermove,*pointerout,*pointerover,*pointerrawupdate,*pointerup,*progress,*ratechange,*reset,*resize,*scroll,*scrollend,*securitypolicyviolation,*seeked,*seeking,*select,*selectionchange,*selectstart,*slotchange,*stalled,*submit,*suspend,*timeupdate,*toggle,*transitioncancel,*transitionend,*transitionrun,*transitionstart,*volumechange,*waiting,*webkitanimationend,*webkitanimationiteration,*webkitanimationstart,*webkittransitionend,*wheel,%style,#tabIndex",
        ":math:math^:math:|",
        ":math:maction^:math:|",
        ":math:menclose^:math:|",
        ":math:merror^:math:|",
        ":math:mfenced^:math:|",
        ":math:mfrac^:math:|",
        ":math:mi^:math:|",
        ":math:mmultiscripts^:math:|",
        ":math:mn^:math:|",
        ":math:mo^:math:|",
        ":math:mover^:math:|",
        ":math:mpadded^:math:|",
        ":math:mphantom^:math:|",
        ":math:mroot^:math:|",
        ":math:mrow^:math:|",
        ":math:ms^:math:|",
        ":math:mspace^:math:|",
        ":math:msqrt^:math:|",
        ":math:mstyle^:math:|",
        ":math:msub^:math:|",
        ":math:msubsup^:math:|",
        ":math:msup^:math:|",
        ":math:mtable^:math:|",
        ":math:mtd^:math:|",
        ":math:mtext^:math:|",
        ":math:mtr^:math:|",
        ":math:munder^:math:|",
        ":math:munderover^:math:|",
        ":math:semantics^:math:|",
    ]
});

/// Map from attribute names to property names
pub static ATTR_TO_PROP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Basic HTML attributes
    map.insert("class", "className");
    map.insert("for", "htmlFor");
    map.insert("formaction", "formAction");
    map.insert("innerHtml", "innerHTML");
    map.insert("readonly", "readOnly");
    map.insert("tabindex", "tabIndex");

    // ARIA attributes (https://www.w3.org/TR/wai-aria-1.3/#accessibilityroleandproperties-correspondence)
    map.insert("aria-activedescendant", "ariaActiveDescendantElement");
    map.insert("aria-atomic", "ariaAtomic");
    map.insert("aria-autocomplete", "ariaAutoComplete");
    map.insert("aria-busy", "ariaBusy");
    map.insert("aria-checked", "ariaChecked");
    map.insert("aria-colcount", "ariaColCount");
    map.insert("aria-colindex", "ariaColIndex");
    map.insert("aria-colindextext", "ariaColIndexText");
    map.insert("aria-colspan", "ariaColSpan");
    map.insert("aria-controls", "ariaControlsElements");
    map.insert("aria-current", "ariaCurrent");
    map.insert("aria-describedby", "ariaDescribedByElements");
    map.insert("aria-description", "ariaDescription");
    map.insert("aria-details", "ariaDetailsElements");
    map.insert("aria-disabled", "ariaDisabled");
    map.insert("aria-errormessage", "ariaErrorMessageElements");
    map.insert("aria-expanded", "ariaExpanded");
    map.insert("aria-flowto", "ariaFlowToElements");
    map.insert("aria-haspopup", "ariaHasPopup");
    map.insert("aria-hidden", "ariaHidden");
    map.insert("aria-invalid", "ariaInvalid");
    map.insert("aria-keyshortcuts", "ariaKeyShortcuts");
    map.insert("aria-label", "ariaLabel");
    map.insert("aria-labelledby", "ariaLabelledByElements");
    map.insert("aria-level", "ariaLevel");
    map.insert("aria-live", "ariaLive");
    map.insert("aria-modal", "ariaModal");
    map.insert("aria-multiline", "ariaMultiLine");
    map.insert("aria-multiselectable", "ariaMultiSelectable");
    map.insert("aria-orientation", "ariaOrientation");
    map.insert("aria-owns", "ariaOwnsElements");
    map.insert("aria-placeholder", "ariaPlaceholder");
    map.insert("aria-posinset", "ariaPosInSet");
    map.insert("aria-pressed", "ariaPressed");
    map.insert("aria-readonly", "ariaReadOnly");
    map.insert("aria-required", "ariaRequired");
    map.insert("aria-roledescription", "ariaRoleDescription");
    map.insert("aria-rowcount", "ariaRowCount");
    map.insert("aria-rowindex", "ariaRowIndex");
    map.insert("aria-rowindextext", "ariaRowIndexText");
    map.insert("aria-rowspan", "ariaRowSpan");
    map.insert("aria-selected", "ariaSelected");
    map.insert("aria-setsize", "ariaSetSize");
    map.insert("aria-sort", "ariaSort");
    map.insert("aria-valuemax", "ariaValueMax");
    map.insert("aria-valuemin", "ariaValueMin");
    map.insert("aria-valuenow", "ariaValueNow");
    map.insert("aria-valuetext", "ariaValueText");

    map
});

/// Shared registry built from [`SCHEMA`] on first use.
pub static DOM_SCHEMA: Lazy<DomElementSchemaRegistry> = Lazy::new(DomElementSchemaRegistry::new);

fn is_ng_container(tag_name: &str) -> bool {
    tag_name.rsplit(':').next() == Some("ng-container")
}

fn is_ng_content(tag_name: &str) -> bool {
    tag_name.rsplit(':').next() == Some("ng-content")
}

pub struct DomElementSchemaRegistry {
    /// Lowercased tag name to its property names, inherited ones included.
    properties: HashMap<String, HashSet<String>>,
}

impl DomElementSchemaRegistry {
    pub fn new() -> Self {
        let mut properties: HashMap<String, HashSet<String>> = HashMap::new();

        for encoded in SCHEMA.iter() {
            let Some((types, props)) = encoded.split_once('|') else {
                continue;
            };
            let (tags, parent) = match types.split_once('^') {
                Some((tags, parent)) => (tags, Some(parent.to_lowercase())),
                None => (types, None),
            };

            let mut own_props = parent.as_ref().and_then(|p| properties.get(p)).cloned().unwrap_or_default();
            // `*name` entries are DOM events, never bindable properties.
            for prop in props.split(',').filter(|prop| !prop.is_empty() && !prop.starts_with('*')) {
                own_props.insert(prop.trim_start_matches(['!', '#', '%']).to_string());
            }

            for tag in tags.split(',') {
                properties.insert(tag.to_lowercase(), own_props.clone());
            }
        }

        DomElementSchemaRegistry { properties }
    }

    pub fn has_element(&self, tag_name: &str, schemas: &[SchemaMetadata]) -> bool {
        if schemas.contains(&SchemaMetadata::NoErrorsSchema) {
            return true;
        }
        if tag_name.contains('-') {
            if is_ng_container(tag_name) || is_ng_content(tag_name) {
                return true;
            }
            if schemas.contains(&SchemaMetadata::CustomElementsSchema) {
                return true;
            }
        }
        self.properties.contains_key(&tag_name.to_lowercase())
    }

    pub fn has_property(&self, tag_name: &str, prop_name: &str, schemas: &[SchemaMetadata]) -> bool {
        if schemas.contains(&SchemaMetadata::NoErrorsSchema) {
            return true;
        }
        if tag_name.contains('-') {
            if is_ng_container(tag_name) || is_ng_content(tag_name) {
                return false;
            }
            // Properties of custom elements are only known once they are defined.
            if schemas.contains(&SchemaMetadata::CustomElementsSchema) {
                return true;
            }
        }
        self.properties
            .get(&tag_name.to_lowercase())
            .or_else(|| self.properties.get("unknown"))
            .map_or(false, |props| props.contains(prop_name))
    }

    /// The DOM property an attribute-style name binds to, e.g. `for` to `htmlFor`.
    pub fn mapped_prop_name<'a>(&self, attr_name: &'a str) -> &'a str {
        ATTR_TO_PROP.get(attr_name).copied().unwrap_or(attr_name)
    }
}

impl Default for DomElementSchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_element() {
        assert!(DOM_SCHEMA.has_element("div", &[]));
        assert!(DOM_SCHEMA.has_element("ng-container", &[]));
        assert!(!DOM_SCHEMA.has_element("my-cmp", &[]));
        assert!(DOM_SCHEMA.has_element("my-cmp", &[SchemaMetadata::CustomElementsSchema]));
        assert!(DOM_SCHEMA.has_element("foo", &[SchemaMetadata::NoErrorsSchema]));
    }

    #[test]
    fn test_inherited_properties() {
        assert!(DOM_SCHEMA.has_property("div", "title", &[]));
        assert!(DOM_SCHEMA.has_property("div", "id", &[]));
        assert!(DOM_SCHEMA.has_property("input", "value", &[]));
        assert!(!DOM_SCHEMA.has_property("div", "fooBar", &[]));
        assert!(!DOM_SCHEMA.has_property("ng-container", "id", &[SchemaMetadata::CustomElementsSchema]));
    }

    #[test]
    fn test_events_are_not_properties() {
        assert!(!DOM_SCHEMA.has_property("div", "click", &[]));
    }

    #[test]
    fn test_mapped_prop_name() {
        assert_eq!(DOM_SCHEMA.mapped_prop_name("for"), "htmlFor");
        assert_eq!(DOM_SCHEMA.mapped_prop_name("title"), "title");
    }
}
